//! API response types for the Steam Web API.

use serde::{Deserialize, Serialize};

/// One owned game from `GetOwnedGames`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedGame {
    pub appid: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub img_icon_url: String,
}

/// Every Steam Web API response nests its payload under `response`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub response: T,
}

/// Payload of `GetOwnedGames`.
///
/// A private or invisible library comes back as an empty `response` object,
/// so every field must be optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwnedGamesPayload {
    #[allow(dead_code)]
    pub game_count: Option<u32>,
    pub games: Option<Vec<OwnedGame>>,
}

/// Payload of `ResolveVanityURL`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct VanityPayload {
    #[serde(default)]
    pub success: i32,
    pub steamid: Option<String>,
}
