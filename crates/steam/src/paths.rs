use std::path::{Path, PathBuf};

use crate::SteamError;

/// Provides access to Steam directory paths.
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the steamapps directory inside a library root.
    pub fn steamapps_dir(library_root: &Path) -> PathBuf {
        library_root.join("steamapps")
    }

    /// Returns the path to the library index file.
    pub fn libraryfolders_path(&self) -> PathBuf {
        Self::steamapps_dir(&self.base_dir).join("libraryfolders.vdf")
    }

    /// Returns the path to the local login index file.
    pub fn loginusers_path(&self) -> PathBuf {
        self.base_dir.join("config").join("loginusers.vdf")
    }

    /// Returns true if the base directory holds a library index file.
    pub fn has_library_index(&self) -> bool {
        self.libraryfolders_path().exists()
    }
}

// Platform-specific base directory detection.
#[cfg(not(windows))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_linux::get_base_dir()
}

#[cfg(windows)]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_windows::get_base_dir()
}
