//! Core game model shared across the workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Remote icon reference from the owned-games listing: the CDN image is
/// addressed by `<appid>/<hash>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRef {
    pub hash: String,
    pub ext: String,
}

/// How a shortcut launches its game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LaunchTarget {
    /// Launched through the Steam client via `steam://rungameid/<appid>`.
    Steam,
    /// Launched directly, for manually added non-Steam games.
    External { exe: String, args: String },
}

/// One game eligible for a shortcut.
///
/// `icon_ref` is the remote reference (present only when the queried
/// account owns the game); `icon` is the resolved local file, filled in by
/// probing or downloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledGame {
    pub app_id: String,
    pub name: String,
    pub install_dir: PathBuf,
    pub icon_ref: Option<IconRef>,
    pub icon: Option<PathBuf>,
    pub launch: LaunchTarget,
}

impl InstalledGame {
    /// Builds a Steam-launched game from a scanned manifest.
    pub fn steam(
        app_id: impl Into<String>,
        name: impl Into<String>,
        install_dir: impl Into<PathBuf>,
        icon_ref: Option<IconRef>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            name: name.into(),
            install_dir: install_dir.into(),
            icon_ref,
            icon: None,
            launch: LaunchTarget::Steam,
        }
    }

    /// Builds a manually entered non-Steam game.
    ///
    /// The app id is synthesized from the executable and name, the same way
    /// the Steam client derives ids for non-Steam shortcuts, so manual
    /// entries get stable keys that cannot collide with real store ids.
    pub fn external(
        name: impl Into<String>,
        exe: impl Into<String>,
        args: impl Into<String>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        let exe = exe.into();
        let app_id = generate_app_id(&exe, &name).to_string();
        Self {
            app_id,
            name,
            install_dir: install_dir.into(),
            icon_ref: None,
            icon: None,
            launch: LaunchTarget::External {
                exe,
                args: args.into(),
            },
        }
    }
}

/// Generates a shortcut app id the way the Steam client does for non-Steam
/// games: CRC32 over exe + name with the top bit and the shortcut flag set.
pub fn generate_app_id(exe: &str, name: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(exe.as_bytes());
    hasher.update(name.as_bytes());
    hasher.finalize() | 0x80000000 | 0x02000000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steam_constructor_defaults() {
        let game = InstalledGame::steam("440", "Team Fortress 2", "/games/tf2", None);
        assert_eq!(game.app_id, "440");
        assert_eq!(game.launch, LaunchTarget::Steam);
        assert!(game.icon.is_none());
        assert!(game.icon_ref.is_none());
    }

    #[test]
    fn external_constructor_synthesizes_id() {
        let game = InstalledGame::external("Doom", "/games/doom.exe", "-fast", "/games");
        let expected = generate_app_id("/games/doom.exe", "Doom").to_string();
        assert_eq!(game.app_id, expected);
        assert_eq!(
            game.launch,
            LaunchTarget::External {
                exe: "/games/doom.exe".into(),
                args: "-fast".into(),
            }
        );
    }

    #[test]
    fn generated_ids_have_flag_bits() {
        let id = generate_app_id("/usr/bin/game", "A Game");
        assert_eq!(id & 0x80000000, 0x80000000);
        assert_eq!(id & 0x02000000, 0x02000000);
    }

    #[test]
    fn generated_ids_deterministic_and_input_sensitive() {
        let a = generate_app_id("/bin/a", "Game");
        assert_eq!(a, generate_app_id("/bin/a", "Game"));
        assert_ne!(a, generate_app_id("/bin/b", "Game"));
        assert_ne!(a, generate_app_id("/bin/a", "Other"));
    }

    #[test]
    fn game_json_field_names() {
        let game = InstalledGame::steam("10", "CS", "/games/cs", None);
        let json = serde_json::to_string(&game).unwrap();
        assert!(json.contains("\"appId\""));
        assert!(json.contains("\"installDir\""));
    }
}
