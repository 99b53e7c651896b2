//! Steam Web API client for owned-games and account resolution.
//!
//! Wraps the two endpoints the tool needs: `ISteamUser/ResolveVanityURL`
//! (handle → numeric id) and `IPlayerService/GetOwnedGames` (id → owned
//! games with icon hashes). The API key and base URL are injected at
//! construction; nothing is global.

pub mod client;
pub mod types;

pub use client::{Client, Error, icon_refs};
pub use types::OwnedGame;
