//! Icon resolution: local probing, CDN download, and ICO re-encoding.
//!
//! Each game's icon lives at a deterministic path inside its install
//! directory. The prober only checks existence; the fetcher downloads
//! missing icons from the Steam CDN and re-saves them in ICO format.
//! Both operations are best-effort per game and never abort the batch.

use std::collections::BTreeMap;
use std::path::PathBuf;

use gamelink_steam::types::InstalledGame;
use image::ImageFormat;
use tracing::{debug, info, warn};

/// Default CDN base for per-app icon images.
pub const DEFAULT_CDN_BASE: &str =
    "https://steamcdn-a.akamaihd.net/steamcommunity/public/images/apps";

/// Largest dimension the ICO container supports.
const ICO_MAX_DIM: u32 = 256;

/// Errors from icon operations.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download returned status {0}")]
    Status(u16),

    #[error("image decode/encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no remote icon reference")]
    NoIconRef,
}

/// One icon that could not be fetched; reported to the caller so it can be
/// appended to the error log.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub app_id: String,
    pub name: String,
    pub reason: String,
}

/// Returns the deterministic icon path for a game.
///
/// `<install_dir>/<icon hash>.ico` when the remote reference is known,
/// `<install_dir>/icon.ico` otherwise.
pub fn icon_path(game: &InstalledGame) -> PathBuf {
    let stem = game
        .icon_ref
        .as_ref()
        .map(|r| r.hash.as_str())
        .unwrap_or("icon");
    game.install_dir.join(format!("{stem}.ico"))
}

/// Records already-present icons on each game.
///
/// Pure existence check; returns how many icons were found.
pub fn probe_local_icons(games: &mut BTreeMap<String, InstalledGame>) -> usize {
    let mut found = 0;
    for game in games.values_mut() {
        let path = icon_path(game);
        if path.is_file() {
            debug!(app_id = %game.app_id, path = %path.display(), "found existing icon");
            game.icon = Some(path);
            found += 1;
        }
    }
    found
}

/// Downloads and re-encodes missing icons.
pub struct IconFetcher {
    http: reqwest::Client,
    cdn_base: String,
}

impl IconFetcher {
    /// Creates a fetcher against the default Steam CDN.
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_cdn_base(http, DEFAULT_CDN_BASE)
    }

    /// Creates a fetcher with a custom CDN base URL (for testing).
    pub fn with_cdn_base(http: reqwest::Client, cdn_base: impl Into<String>) -> Self {
        Self {
            http,
            cdn_base: cdn_base.into(),
        }
    }

    /// Fetches an icon for every game that lacks one but has a remote
    /// reference, saving it at the deterministic path and recording it on
    /// the game. Failures are collected and returned; the batch always runs
    /// to completion. Games with a resolved icon are never re-fetched.
    pub async fn fetch_missing(
        &self,
        games: &mut BTreeMap<String, InstalledGame>,
    ) -> Vec<FetchFailure> {
        let mut failures = Vec::new();

        for game in games.values_mut() {
            if game.icon.is_some() {
                continue;
            }

            info!(app_id = %game.app_id, name = %game.name, "downloading icon");
            match self.fetch_one(game).await {
                Ok(path) => {
                    game.icon = Some(path);
                }
                Err(e) => {
                    warn!(app_id = %game.app_id, error = %e, "icon fetch failed");
                    failures.push(FetchFailure {
                        app_id: game.app_id.clone(),
                        name: game.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        failures
    }

    /// Downloads one game's icon and re-encodes it as ICO.
    async fn fetch_one(&self, game: &InstalledGame) -> Result<PathBuf, IconError> {
        let icon_ref = game.icon_ref.as_ref().ok_or(IconError::NoIconRef)?;

        let url = format!(
            "{}/{}/{}.{}",
            self.cdn_base, game.app_id, icon_ref.hash, icon_ref.ext
        );
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(IconError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await?.to_vec();

        let path = icon_path(game);
        reencode_as_ico(&bytes, &path)?;
        Ok(path)
    }
}

/// Decodes image bytes and writes them as an ICO file.
///
/// Oversized images are downscaled to the ICO dimension limit first.
fn reencode_as_ico(bytes: &[u8], path: &std::path::Path) -> Result<(), IconError> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > ICO_MAX_DIM || img.height() > ICO_MAX_DIM {
        img.thumbnail(ICO_MAX_DIM, ICO_MAX_DIM)
    } else {
        img
    };
    img.to_rgba8().save_with_format(path, ImageFormat::Ico)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamelink_steam::types::IconRef;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn game_with_ref(dir: &std::path::Path, app_id: &str, hash: &str) -> InstalledGame {
        InstalledGame::steam(
            app_id,
            format!("Game {app_id}"),
            dir,
            Some(IconRef {
                hash: hash.into(),
                ext: "jpg".into(),
            }),
        )
    }

    /// Encodes a small solid-color PNG in memory.
    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Serves the given raw body to every connection, counting requests in
    /// the shared counter.
    async fn mock_cdn(
        body: Vec<u8>,
    ) -> (
        String,
        std::sync::Arc<std::sync::atomic::AtomicUsize>,
        tokio::task::JoinHandle<()>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let served = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = served.clone();

        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                let mut buf = vec![0u8; 8192];
                let _ = stream.read(&mut buf).await;

                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, served, handle)
    }

    #[test]
    fn icon_path_uses_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_with_ref(tmp.path(), "10", "abc123");
        assert_eq!(icon_path(&game), tmp.path().join("abc123.ico"));
    }

    #[test]
    fn icon_path_fixed_name_without_ref() {
        let tmp = tempfile::tempdir().unwrap();
        let game = InstalledGame::steam("10", "No Ref", tmp.path(), None);
        assert_eq!(icon_path(&game), tmp.path().join("icon.ico"));
    }

    #[test]
    fn probe_finds_existing_icon() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_with_ref(tmp.path(), "10", "abc123");
        std::fs::write(tmp.path().join("abc123.ico"), b"ico").unwrap();

        let mut games = BTreeMap::from([("10".to_string(), game)]);
        let found = probe_local_icons(&mut games);

        assert_eq!(found, 1);
        assert_eq!(games["10"].icon, Some(tmp.path().join("abc123.ico")));
    }

    #[test]
    fn probe_leaves_missing_icon_unresolved() {
        let tmp = tempfile::tempdir().unwrap();
        let game = game_with_ref(tmp.path(), "10", "abc123");

        let mut games = BTreeMap::from([("10".to_string(), game)]);
        let found = probe_local_icons(&mut games);

        assert_eq!(found, 0);
        assert!(games["10"].icon.is_none());
    }

    #[test]
    fn reencode_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out.ico");
        reencode_as_ico(&tiny_png(), &out).unwrap();

        let decoded = image::open(&out).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn reencode_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out.ico");
        assert!(matches!(
            reencode_as_ico(b"not an image", &out),
            Err(IconError::Image(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn reencode_downscales_oversized() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("big.ico");
        let img = image::RgbaImage::from_pixel(512, 512, image::Rgba([0, 255, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();

        reencode_as_ico(&buf.into_inner(), &out).unwrap();
        let decoded = image::open(&out).unwrap();
        assert!(decoded.width() <= 256);
    }

    #[tokio::test]
    async fn fetch_saves_ico_and_records_path() {
        let tmp = tempfile::tempdir().unwrap();
        let (url, _served, handle) = mock_cdn(tiny_png()).await;

        let mut games = BTreeMap::from([(
            "10".to_string(),
            game_with_ref(tmp.path(), "10", "abc123"),
        )]);

        let fetcher = IconFetcher::with_cdn_base(reqwest::Client::new(), url);
        let failures = fetcher.fetch_missing(&mut games).await;

        assert!(failures.is_empty());
        let icon = games["10"].icon.as_ref().unwrap();
        assert_eq!(icon, &tmp.path().join("abc123.ico"));
        assert!(icon.is_file());

        handle.abort();
    }

    #[tokio::test]
    async fn fetch_skips_games_with_resolved_icon() {
        let tmp = tempfile::tempdir().unwrap();
        let (url, served, handle) = mock_cdn(tiny_png()).await;

        let mut game = game_with_ref(tmp.path(), "10", "abc123");
        game.icon = Some(tmp.path().join("abc123.ico"));
        let mut games = BTreeMap::from([("10".to_string(), game)]);

        let fetcher = IconFetcher::with_cdn_base(reqwest::Client::new(), url);
        let failures = fetcher.fetch_missing(&mut games).await;

        assert!(failures.is_empty());
        // The mock CDN must never have been contacted.
        assert_eq!(served.load(std::sync::atomic::Ordering::SeqCst), 0);
        handle.abort();
    }

    #[tokio::test]
    async fn fetch_failure_is_collected_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        // Serve garbage bytes: download succeeds, decode fails.
        let (url, _served, handle) = mock_cdn(b"not an image".to_vec()).await;

        let mut games = BTreeMap::from([(
            "10".to_string(),
            game_with_ref(tmp.path(), "10", "abc123"),
        )]);
        // A game with no remote reference fails with NoIconRef but must not
        // stop the batch.
        games.insert(
            "20".to_string(),
            InstalledGame::steam("20", "Unowned", tmp.path(), None),
        );

        let fetcher = IconFetcher::with_cdn_base(reqwest::Client::new(), url);
        let failures = fetcher.fetch_missing(&mut games).await;

        assert_eq!(failures.len(), 2);
        assert!(games.values().all(|g| g.icon.is_none()));
        assert!(failures.iter().any(|f| f.app_id == "20" && f.reason.contains("no remote icon")));

        handle.abort();
    }
}
