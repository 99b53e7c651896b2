//! Manifest scanner: discovers installed games across library roots.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::paths::Paths;
use crate::types::{IconRef, InstalledGame};
use crate::vdf::extract_quoted_field;

const MANIFEST_PREFIX: &str = "appmanifest_";
const MANIFEST_EXT: &str = "acf";

/// Scans every library root for installed games.
///
/// Reads `steamapps/appmanifest_<appid>.acf` files, extracting the display
/// name and install directory. The install directory must exist under
/// `steamapps/common/` or the game is dropped (stale manifests outlive
/// uninstalls). Any per-manifest failure is logged and skipped; one bad file
/// never aborts the batch. Icon references from `icon_refs` are attached to
/// the games the queried account owns.
pub fn scan_installed(
    roots: &[PathBuf],
    icon_refs: &HashMap<String, IconRef>,
) -> BTreeMap<String, InstalledGame> {
    let mut games = BTreeMap::new();

    for root in roots {
        let steamapps = Paths::steamapps_dir(root);
        let entries = match fs::read_dir(&steamapps) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %steamapps.display(), error = %e, "cannot read steamapps dir, skipping library");
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(app_id) = manifest_app_id(&path) else {
                continue;
            };

            match read_manifest(&path, &app_id) {
                Ok(Some(game)) => {
                    let mut game = game;
                    game.icon_ref = icon_refs.get(&app_id).cloned();
                    games.insert(app_id, game);
                }
                Ok(None) => {
                    debug!(manifest = %path.display(), "install dir missing, dropping game");
                }
                Err(reason) => {
                    warn!(manifest = %path.display(), %reason, "skipping manifest");
                }
            }
        }
    }

    games
}

/// Returns the app id if the path names a manifest file.
fn manifest_app_id(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXT) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let id = stem.strip_prefix(MANIFEST_PREFIX)?;
    if id.is_empty() || id.parse::<u64>().is_err() {
        return None;
    }
    Some(id.to_string())
}

/// Reads one manifest, returning `Ok(None)` when the game's install
/// directory no longer exists.
fn read_manifest(path: &Path, app_id: &str) -> Result<Option<InstalledGame>, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;

    let name =
        extract_quoted_field(&content, "name").ok_or_else(|| "missing 'name' field".to_string())?;
    let install_dir = extract_quoted_field(&content, "installdir")
        .ok_or_else(|| "missing 'installdir' field".to_string())?;

    let parent = path
        .parent()
        .ok_or_else(|| "manifest has no parent directory".to_string())?;
    let location = parent.join("common").join(&install_dir);

    if !location.is_dir() {
        return Ok(None);
    }

    Ok(Some(InstalledGame::steam(app_id, name, location, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays down a library root with a steamapps dir, one manifest per game,
    /// and (optionally) the matching install directory.
    fn make_library(
        base: &Path,
        games: &[(&str, &str, &str, bool)], // (appid, name, installdir, create_dir)
    ) -> PathBuf {
        let steamapps = base.join("steamapps");
        fs::create_dir_all(steamapps.join("common")).unwrap();

        for (app_id, name, dir, create) in games {
            let manifest = format!(
                "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"installdir\"\t\t\"{dir}\"\n}}\n"
            );
            fs::write(
                steamapps.join(format!("appmanifest_{app_id}.acf")),
                manifest,
            )
            .unwrap();
            if *create {
                fs::create_dir_all(steamapps.join("common").join(dir)).unwrap();
            }
        }

        base.to_path_buf()
    }

    #[test]
    fn scans_well_formed_manifests() {
        let tmp = tempfile::tempdir().unwrap();
        let root = make_library(tmp.path(), &[("10", "Game One", "GameOne", true)]);

        let games = scan_installed(&[root], &HashMap::new());
        assert_eq!(games.len(), 1);
        let game = &games["10"];
        assert_eq!(game.name, "Game One");
        assert!(game.install_dir.ends_with("common/GameOne"));
    }

    #[test]
    fn missing_install_dir_drops_game() {
        let tmp = tempfile::tempdir().unwrap();
        let root = make_library(tmp.path(), &[("20", "Gone Game", "GoneGame", false)]);

        let games = scan_installed(&[root], &HashMap::new());
        assert!(games.is_empty());
    }

    #[test]
    fn two_library_scenario() {
        // Library A has a valid game 10; library B's game 20 references a
        // directory that does not exist. Only 10 survives.
        let tmp = tempfile::tempdir().unwrap();
        let a = make_library(&tmp.path().join("a"), &[("10", "Game One", "GameOne", true)]);
        let b = make_library(&tmp.path().join("b"), &[("20", "Game Two", "GameTwo", false)]);

        let games = scan_installed(&[a, b], &HashMap::new());
        assert_eq!(games.keys().collect::<Vec<_>>(), vec!["10"]);
    }

    #[test]
    fn manifest_missing_field_skips_only_that_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let root = make_library(tmp.path(), &[("30", "Good Game", "GoodGame", true)]);

        // A manifest with no installdir field alongside the good one.
        fs::write(
            tmp.path().join("steamapps").join("appmanifest_40.acf"),
            "\"AppState\"\n{\n\t\"name\"\t\t\"Broken\"\n}\n",
        )
        .unwrap();

        let games = scan_installed(&[root], &HashMap::new());
        assert_eq!(games.keys().collect::<Vec<_>>(), vec!["30"]);
    }

    #[test]
    fn unreadable_library_root_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let good = make_library(tmp.path(), &[("50", "Survivor", "Survivor", true)]);
        let missing = tmp.path().join("not-a-library");

        let games = scan_installed(&[missing, good], &HashMap::new());
        assert_eq!(games.len(), 1);
    }

    #[test]
    fn icon_refs_attached_to_owned_games() {
        let tmp = tempfile::tempdir().unwrap();
        let root = make_library(
            tmp.path(),
            &[("10", "Owned", "Owned", true), ("20", "Unowned", "Unowned", true)],
        );

        let mut refs = HashMap::new();
        refs.insert(
            "10".to_string(),
            IconRef {
                hash: "abc123".into(),
                ext: "jpg".into(),
            },
        );

        let games = scan_installed(&[root], &refs);
        assert_eq!(games["10"].icon_ref.as_ref().unwrap().hash, "abc123");
        assert!(games["20"].icon_ref.is_none());
    }

    #[test]
    fn non_manifest_files_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let root = make_library(tmp.path(), &[]);
        let steamapps = tmp.path().join("steamapps");
        fs::write(steamapps.join("appmanifest_notanid.acf"), "junk").unwrap();
        fs::write(steamapps.join("libraryfolders.vdf"), "junk").unwrap();

        let games = scan_installed(&[root], &HashMap::new());
        assert!(games.is_empty());
    }

    #[test]
    fn manifest_app_id_parsing() {
        assert_eq!(
            manifest_app_id(Path::new("/x/appmanifest_440.acf")).as_deref(),
            Some("440")
        );
        assert_eq!(manifest_app_id(Path::new("/x/appmanifest_440.vdf")), None);
        assert_eq!(manifest_app_id(Path::new("/x/other_440.acf")), None);
        assert_eq!(manifest_app_id(Path::new("/x/appmanifest_.acf")), None);
    }
}
