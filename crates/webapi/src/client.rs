//! Steam Web API client.
//!
//! Async HTTP client using `reqwest`, with the API key passed as a query
//! parameter the way the Steam Web API expects.

use std::collections::HashMap;

use gamelink_steam::types::IconRef;
use tracing::debug;

use crate::types::{Envelope, OwnedGame, OwnedGamesPayload, VanityPayload};

const DEFAULT_BASE_URL: &str = "https://api.steampowered.com";

/// Steam CDN reports icons as bare hashes; the images themselves are JPEGs.
const ICON_EXT: &str = "jpg";

/// Errors from the Steam Web API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not resolve '{0}' to a Steam account")]
    UnknownAccount(String),

    #[error("game library for {steam_id} is empty or not publicly visible")]
    PrivateLibrary { steam_id: String, body: String },
}

/// Steam Web API client.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    /// Creates a new client with the given API key.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Sets a custom base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Performs a GET request with the API key attached.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, Error> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Resolves a vanity handle to a numeric Steam id.
    ///
    /// Returns `Ok(None)` when the API answers but finds no match.
    pub async fn resolve_vanity(&self, handle: &str) -> Result<Option<String>, Error> {
        let body = self
            .get(
                "/ISteamUser/ResolveVanityURL/v0001/",
                &[("vanityurl", handle)],
            )
            .await?;
        let env: Envelope<VanityPayload> = serde_json::from_str(&body)?;

        if env.response.success == 1 {
            Ok(env.response.steamid)
        } else {
            Ok(None)
        }
    }

    /// Returns the owned games for a Steam id.
    ///
    /// An empty game list means the library is private or invisible and is
    /// reported as [`Error::PrivateLibrary`] with the raw response body, so
    /// the caller can persist it for diagnosis.
    pub async fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, Error> {
        let body = self
            .get(
                "/IPlayerService/GetOwnedGames/v0001/",
                &[
                    ("steamid", steam_id),
                    ("include_appinfo", "true"),
                    ("include_played_free_games", "true"),
                ],
            )
            .await?;
        let env: Envelope<OwnedGamesPayload> = serde_json::from_str(&body)?;

        match env.response.games {
            Some(games) if !games.is_empty() => {
                debug!(steam_id, count = games.len(), "fetched owned games");
                Ok(games)
            }
            _ => Err(Error::PrivateLibrary {
                steam_id: steam_id.to_string(),
                body,
            }),
        }
    }

    /// Resolves user input (vanity handle or numeric id) to a Steam id.
    ///
    /// Tries vanity resolution first. If that finds no match and the input
    /// is numeric, the id is verified against the owned-games endpoint
    /// before being accepted. Each fallback step is an explicit decision
    /// here, not an exception path.
    pub async fn resolve_account(&self, input: &str) -> Result<String, Error> {
        if let Some(id) = self.resolve_vanity(input).await? {
            debug!(handle = input, steam_id = %id, "resolved vanity handle");
            return Ok(id);
        }

        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            // Verify the literal id actually answers before accepting it.
            self.owned_games(input).await?;
            return Ok(input.to_string());
        }

        Err(Error::UnknownAccount(input.to_string()))
    }
}

/// Builds the app-id → icon-reference map from an owned-games list.
///
/// Games without an icon hash are excluded; they simply end up icon-less
/// later, which is expected.
pub fn icon_refs(games: &[OwnedGame]) -> HashMap<String, IconRef> {
    games
        .iter()
        .filter(|g| !g.img_icon_url.is_empty())
        .map(|g| {
            (
                g.appid.to_string(),
                IconRef {
                    hash: g.img_icon_url.clone(),
                    ext: ICON_EXT.to_string(),
                },
            )
        })
        .collect()
}
