//! Steam integration: install-path detection, VDF parsing, library and
//! manifest scanning, and local account discovery.
//!
//! Everything here is filesystem-only; network lookups live in the
//! `gamelink-webapi` crate.

pub mod libraries;
pub mod manifests;
pub mod paths;
pub mod types;
pub mod users;
pub mod vdf;

#[cfg(not(windows))]
mod paths_linux;
#[cfg(windows)]
mod paths_windows;

pub use libraries::library_roots;
pub use manifests::scan_installed;
pub use paths::Paths;
pub use types::{IconRef, InstalledGame, LaunchTarget, generate_app_id};
pub use users::{LocalUser, local_users};

/// Errors from Steam filesystem discovery.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("library index not found at {0}")]
    LibraryIndexNotFound(String),

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("I/O error: {0}")]
    Io(String),
}
