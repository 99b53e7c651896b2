//! Interactive run: discovery, resolution, icons, shortcuts, summary.
//!
//! This module owns the prompt sequencing and fatal-error policy; all the
//! heavy lifting is delegated to the library crates, which take resolved
//! inputs and never prompt.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, anyhow};
use gamelink_icons::IconFetcher;
use gamelink_shortcuts::{ShortcutError, WriteOutcome, default_folder, start_menu_folder, write_shortcuts};
use gamelink_steam::{InstalledGame, Paths, library_roots, local_users, scan_installed};
use gamelink_webapi::{Client, Error as ApiError, icon_refs};
use tracing::debug;

use crate::errlog::ErrorLog;
use crate::prompts;

/// Published Steam Web API key used when `STEAM_API_KEY` is not set.
const DEFAULT_API_KEY: &str = "20F58DAB4E215359D7667DB18C99BD8D";

pub async fn run() -> anyhow::Result<()> {
    let errlog = ErrorLog::new();

    // 1. Locate Steam, falling back to a manual path prompt.
    let paths = match Paths::new() {
        Ok(paths) => paths,
        Err(_) => {
            let entered = prompts::prompt(
                "Failed to find the Steam installation path, please enter it (e.g. C:\\Program Files (x86)\\Steam or ~/.local/share/Steam):\n",
            )?;
            Paths::with_base(entered)
        }
    };
    debug!(base = %paths.base_dir().display(), "using Steam install");

    // 2. Read the library set. A missing index file is fatal: everything
    //    downstream depends on it.
    let roots = library_roots(&paths)
        .context("could not read the Steam library index; is this really a Steam folder?")?;
    if roots.is_empty() {
        println!("No libraries to check");
        return Ok(());
    }

    // 3. Pick or enter an account, resolve it, and fetch owned games.
    let users = local_users(&paths);
    println!("This tool needs to know your Steam account to look up game icons.");
    let account_input = match prompts::choose_local_user(&users) {
        Some(user) => user.id,
        None => prompts::prompt("\nPlease enter your Steam ID, username, or custom profile id: ")?,
    };

    let api_key = std::env::var("STEAM_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let client = Client::new(&api_key)?;

    let steam_id = match client.resolve_account(&account_input).await {
        Ok(id) => id,
        Err(e) => return Err(fatal_api_error(e, &errlog)),
    };
    let owned = match client.owned_games(&steam_id).await {
        Ok(owned) => owned,
        Err(e) => return Err(fatal_api_error(e, &errlog)),
    };
    let refs = icon_refs(&owned);

    // 4. Scan the manifests.
    let mut games = scan_installed(&roots, &refs);
    println!(
        "\nFound {} game{} in the following libraries:",
        games.len(),
        plural(games.len())
    );
    for root in &roots {
        println!("  {}", root.display());
    }

    let unowned: Vec<&InstalledGame> =
        games.values().filter(|g| g.icon_ref.is_none()).collect();
    if !unowned.is_empty() {
        println!(
            "\nFound {} installed game{} not owned by this account:",
            unowned.len(),
            plural(unowned.len())
        );
        for game in &unowned {
            println!("  {}", game.name);
        }
        println!("Shortcuts for these games can still be created, but they will not have icons.");
    }

    // 5. Manual non-Steam entries.
    add_manual_games(&mut games)?;

    if games.is_empty() {
        println!("\nNothing to do.");
        return Ok(());
    }

    // 6. Probe and (optionally) download icons.
    let found = gamelink_icons::probe_local_icons(&mut games);
    println!(
        "\nFound {found} existing game icon{}",
        plural(found)
    );

    let missing = games.values().filter(|g| g.icon.is_none()).count();
    if missing > 0 {
        println!("\nMissing icons for {missing} game{}", plural(missing));
        if prompts::confirm("Try to download them now?", true) {
            let fetcher = IconFetcher::new(reqwest::Client::new());
            let failures = fetcher.fetch_missing(&mut games).await;

            if !failures.is_empty() {
                println!(
                    "\nFailed to acquire the following {} icon{}:",
                    failures.len(),
                    plural(failures.len())
                );
                for f in &failures {
                    println!("  {}", f.name);
                    errlog.append(&format!(
                        "icon fetch failed for {} ({}): {}",
                        f.app_id, f.name, f.reason
                    ));
                }
            }
        }
    }

    // 7. Write shortcuts, with the single permission fallback.
    let include_missing =
        prompts::confirm("\nCreate shortcuts for games without icons?", true);
    let start_menu = prompts::confirm(
        "\nAdd shortcuts to the system Start Menu location (may require admin)?",
        false,
    );

    let outcome = write_with_fallback(&games, include_missing, start_menu)?;

    println!(
        "\nDone! Created {} shortcut{}",
        outcome.written,
        plural(outcome.written)
    );
    println!("You can find them in {}", outcome.folder.display());

    Ok(())
}

/// Writes into the chosen folder; a permission failure on the system-wide
/// location triggers exactly one retry into the default local folder.
fn write_with_fallback(
    games: &BTreeMap<String, InstalledGame>,
    include_missing: bool,
    start_menu: bool,
) -> anyhow::Result<WriteOutcome> {
    let folder = if start_menu {
        start_menu_folder()
    } else {
        default_folder()
    };

    match write_shortcuts(games, &folder, include_missing) {
        Ok(outcome) => Ok(outcome),
        Err(ShortcutError::Permission(_)) if start_menu => {
            println!(
                "\nNo permission to write into {}; run from an elevated terminal to use it.",
                folder.display()
            );
            println!("Falling back to {}", default_folder().display());
            write_shortcuts(games, &default_folder(), include_missing)
                .map_err(|e| anyhow!("could not write shortcuts: {e}"))
        }
        Err(e) => Err(anyhow!("could not write shortcuts: {e}")),
    }
}

/// Prompt loop for non-Steam games, terminated by a blank name.
fn add_manual_games(games: &mut BTreeMap<String, InstalledGame>) -> anyhow::Result<()> {
    loop {
        let name =
            prompts::prompt("\nAdd a non-Steam game? Enter its name (or leave blank to continue): ")?;
        if name.is_empty() {
            return Ok(());
        }

        let exe = prompts::prompt("Path to the executable: ")?;
        if exe.is_empty() {
            println!("Skipping '{name}': no executable given.");
            continue;
        }
        let args = prompts::prompt("Launch arguments (optional): ")?;

        let install_dir = Path::new(&exe)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let game = InstalledGame::external(name, exe, args, install_dir);
        games.insert(game.app_id.clone(), game);
    }
}

/// Maps a fatal API error to a diagnostic, appending the private-library
/// case to the error log first.
fn fatal_api_error(e: ApiError, errlog: &ErrorLog) -> anyhow::Error {
    match e {
        ApiError::PrivateLibrary { steam_id, body } => {
            errlog.append(&format!(
                "empty response from Steam API for {steam_id}: {body}"
            ));
            anyhow!(
                "the game library for {steam_id} is empty or not publicly visible \
                 (details appended to {})",
                errlog.path().display()
            )
        }
        ApiError::UnknownAccount(input) => {
            anyhow!(
                "could not resolve '{input}' to a Steam account; \
                 please double-check your details and try again"
            )
        }
        other => anyhow!(other).context("Steam Web API request failed"),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0), "s");
        assert_eq!(plural(1), "");
        assert_eq!(plural(2), "s");
    }

    #[test]
    fn private_library_error_hits_the_log() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ErrorLog::with_path(tmp.path().join("error_log.txt"));

        let err = fatal_api_error(
            ApiError::PrivateLibrary {
                steam_id: "76561197960287930".into(),
                body: r#"{"response":{}}"#.into(),
            },
            &log,
        );

        assert!(err.to_string().contains("76561197960287930"));
        let content = std::fs::read_to_string(log.path()).unwrap();
        let entries = content
            .lines()
            .filter(|l| l.contains("76561197960287930"))
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn unknown_account_error_no_log() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ErrorLog::with_path(tmp.path().join("error_log.txt"));

        let err = fatal_api_error(ApiError::UnknownAccount("nobody".into()), &log);
        assert!(err.to_string().contains("nobody"));
        assert!(!log.path().exists());
    }
}
