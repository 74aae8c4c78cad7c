//! Locates an installed game through the Steam library metadata.

use std::fmt;
use std::path::{Path, PathBuf};

use ddmi_report::Reporter;

use crate::SteamError;
use crate::library::LibraryDescriptor;
use crate::paths::{SteamDir, game_dir_in_library};

/// Steam app id of Doki Doki Literature Club.
pub const DDLC_APP_ID: &str = "698780";

/// Folder name under `steamapps/common`.
pub const DDLC_FOLDER: &str = "Doki Doki Literature Club";

/// Text shown in place of a path when discovery finds nothing.
pub const NOT_FOUND_MESSAGE: &str = "Game directory not found automatically.";

/// Outcome of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameLocation {
    Found(PathBuf),
    NotFound,
}

impl GameLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            GameLocation::Found(p) => Some(p),
            GameLocation::NotFound => None,
        }
    }
}

impl fmt::Display for GameLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameLocation::Found(p) => write!(f, "{}", p.display()),
            GameLocation::NotFound => f.write_str(NOT_FOUND_MESSAGE),
        }
    }
}

/// Finds a game directory across every Steam library on the machine.
#[derive(Debug, Clone)]
pub struct GameFinder {
    app_ids: Vec<String>,
    game_folder: String,
    steam_root: Option<PathBuf>,
}

impl Default for GameFinder {
    fn default() -> Self {
        Self::new(vec![DDLC_APP_ID.to_string()], DDLC_FOLDER)
    }
}

impl GameFinder {
    pub fn new(app_ids: Vec<String>, game_folder: impl Into<String>) -> Self {
        Self {
            app_ids,
            game_folder: game_folder.into(),
            steam_root: None,
        }
    }

    /// Skips install path detection and uses `root` as the Steam directory.
    pub fn with_steam_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.steam_root = Some(root.into());
        self
    }

    /// Probes every candidate library for the game folder.
    ///
    /// Never fails: problems are reported as console lines and yield
    /// [`GameLocation::NotFound`].
    pub fn find(&self, reporter: &dyn Reporter) -> GameLocation {
        let Some(root) = self.resolve_root(reporter) else {
            return GameLocation::NotFound;
        };

        let Some(libraries) = self.candidate_libraries(&root, reporter) else {
            return GameLocation::NotFound;
        };

        for library in &libraries {
            let game_path = game_dir_in_library(library, &self.game_folder);
            reporter.console(&format!("Game Path: {}", game_path.display()));
            if game_path.is_dir() {
                tracing::info!(path = %game_path.display(), "game directory found");
                return GameLocation::Found(game_path);
            }
        }

        reporter.console(NOT_FOUND_MESSAGE);
        GameLocation::NotFound
    }

    fn resolve_root(&self, reporter: &dyn Reporter) -> Option<PathBuf> {
        if let Some(root) = &self.steam_root {
            reporter.console(&format!("Steam Path Value: {}", root.display()));
            return Some(root.clone());
        }

        match SteamDir::detect() {
            Ok(steam) => {
                let root = steam.root().to_path_buf();
                reporter.console(&format!("Steam Path Value: {}", root.display()));
                Some(root)
            }
            Err(e) => {
                tracing::warn!(error = %e, "steam install path lookup failed");
                reporter.console(&format!("Error accessing registry: {e}"));
                None
            }
        }
    }

    /// Returns the launcher root followed by every library that holds one
    /// of the requested apps, without duplicates.
    ///
    /// `None` means the descriptor exists but could not be parsed.
    pub fn candidate_libraries(
        &self,
        root: &Path,
        reporter: &dyn Reporter,
    ) -> Option<Vec<PathBuf>> {
        let vdf_path = SteamDir::at(root).library_folders();

        let mut found: Vec<PathBuf> = Vec::new();
        match LibraryDescriptor::load(&vdf_path) {
            Ok(mut descriptor) => {
                descriptor.retain_apps(&self.app_ids);
                for library in descriptor.libraries {
                    if !library.path.exists() {
                        tracing::debug!(path = %library.path.display(), "library path missing");
                        continue;
                    }
                    if found.contains(&library.path) {
                        continue;
                    }
                    reporter.console(&format!(
                        "Found Steam library with game: {}",
                        library.path.display()
                    ));
                    found.push(library.path);
                }
            }
            Err(SteamError::Io(msg)) => {
                reporter.console(&format!("Error reading VDF: {msg}"));
            }
            Err(e) => {
                tracing::warn!(path = %vdf_path.display(), error = %e, "malformed library descriptor");
                reporter.console(&format!("Error parsing VDF: {e}"));
                return None;
            }
        }

        let joined = found
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        reporter.console(&format!("VDF Paths: {joined}"));

        let mut candidates = vec![root.to_path_buf()];
        for path in found {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }
        Some(candidates)
    }
}
