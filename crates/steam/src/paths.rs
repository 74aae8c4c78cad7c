//! Layout of a Steam installation on disk.

use std::path::{Path, PathBuf};

use crate::SteamError;

/// Root directory of a Steam installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamDir {
    root: PathBuf,
}

impl SteamDir {
    /// Looks up the installation through the registry or the usual home
    /// directory locations, depending on the platform.
    pub fn detect() -> Result<Self, SteamError> {
        locate().map(Self::at)
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `steamapps/libraryfolders.vdf` under the root.
    pub fn library_folders(&self) -> PathBuf {
        self.root.join("steamapps").join("libraryfolders.vdf")
    }
}

/// Where a game folder lives inside a library.
pub fn game_dir_in_library(library: &Path, game_folder: &str) -> PathBuf {
    library.join("steamapps").join("common").join(game_folder)
}

#[cfg(target_os = "linux")]
use crate::paths_linux::get_base_dir as locate;

#[cfg(target_os = "windows")]
use crate::paths_windows::get_base_dir as locate;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn locate() -> Result<PathBuf, SteamError> {
    Err(SteamError::NotFound)
}
