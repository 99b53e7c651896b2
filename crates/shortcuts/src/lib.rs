//! Shortcut file writer.
//!
//! Emits one `[InternetShortcut]`-style text file per game, targeting
//! `steam://rungameid/<appid>` for scanned games or the literal executable
//! for manually entered ones. Display names are sanitized for the
//! filesystem and disambiguated on collision.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gamelink_steam::types::{InstalledGame, LaunchTarget};
use tracing::warn;

/// Characters that may not appear in shortcut filenames.
pub const RESERVED_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Errors from shortcut writing.
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    /// Insufficient privilege for the target folder. The caller is expected
    /// to retry once into the default local folder.
    #[error("permission denied: {0}")]
    Permission(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result of a write pass: how many shortcuts landed, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub written: usize,
    pub folder: PathBuf,
}

/// Returns the default local shortcut folder, `./shortcuts`.
pub fn default_folder() -> PathBuf {
    PathBuf::from("shortcuts")
}

/// Returns the system-wide shortcut location.
///
/// Writing there typically requires elevated privileges.
pub fn start_menu_folder() -> PathBuf {
    #[cfg(windows)]
    {
        let program_data =
            std::env::var("ProgramData").unwrap_or_else(|_| r"C:\ProgramData".to_string());
        Path::new(&program_data)
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs")
            .join("Steam Games")
    }

    #[cfg(not(windows))]
    {
        Path::new("/usr/local/share/applications").join("steam-games")
    }
}

/// Strips filesystem-reserved characters from a display name.
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}

/// Writes a shortcut file for every eligible game into `folder`.
///
/// Games without a resolved icon are skipped unless `include_missing_icons`
/// is set. Sanitized names that collide get a ` (2)`, ` (3)`, … suffix so
/// distinct games never overwrite each other. A per-game write failure is
/// logged and skipped; only folder-level failures abort, with permission
/// problems reported as [`ShortcutError::Permission`] so the caller can
/// fall back to the default folder.
pub fn write_shortcuts(
    games: &BTreeMap<String, InstalledGame>,
    folder: &Path,
    include_missing_icons: bool,
) -> Result<WriteOutcome, ShortcutError> {
    fs::create_dir_all(folder).map_err(classify_io)?;

    let mut used_names: HashMap<String, u32> = HashMap::new();
    let mut written = 0;

    for game in games.values() {
        if game.icon.is_none() && !include_missing_icons {
            continue;
        }

        let filename = unique_filename(&mut used_names, &sanitize_name(&game.name));
        let path = folder.join(filename);

        match fs::write(&path, shortcut_body(game)) {
            Ok(()) => written += 1,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(classify_io(e));
            }
            Err(e) => {
                warn!(name = %game.name, path = %path.display(), error = %e, "failed to write shortcut");
            }
        }
    }

    Ok(WriteOutcome {
        written,
        folder: folder.to_path_buf(),
    })
}

/// Renders the shortcut file body for one game.
///
/// The `IconFile` line is emitted only when an icon was resolved.
fn shortcut_body(game: &InstalledGame) -> String {
    let mut body = String::from("[InternetShortcut]\nIconIndex=0\n");

    match &game.launch {
        LaunchTarget::Steam => {
            body.push_str(&format!("URL=steam://rungameid/{}\n", game.app_id));
        }
        LaunchTarget::External { exe, args } => {
            if args.is_empty() {
                body.push_str(&format!("URL={exe}\n"));
            } else {
                body.push_str(&format!("URL={exe} {args}\n"));
            }
        }
    }

    if let Some(icon) = &game.icon {
        body.push_str(&format!("IconFile={}\n", icon.display()));
    }

    body
}

/// Reserves a unique `<name>.url` filename, suffixing duplicates.
fn unique_filename(used: &mut HashMap<String, u32>, base: &str) -> String {
    let count = used.entry(base.to_string()).or_insert(0);
    *count += 1;
    if *count == 1 {
        format!("{base}.url")
    } else {
        format!("{base} ({count}).url")
    }
}

fn classify_io(e: std::io::Error) -> ShortcutError {
    if e.kind() == ErrorKind::PermissionDenied {
        ShortcutError::Permission(e.to_string())
    } else {
        ShortcutError::Io(e.to_string())
    }
}
