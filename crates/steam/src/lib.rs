//! Steam install lookup, `libraryfolders.vdf` parsing and game discovery.

pub mod discovery;
pub mod library;
pub mod paths;
#[cfg(target_os = "linux")]
mod paths_linux;
#[cfg(target_os = "windows")]
mod paths_windows;

// Re-export primary types.
pub use discovery::{DDLC_APP_ID, DDLC_FOLDER, GameFinder, GameLocation, NOT_FOUND_MESSAGE};
pub use library::{Library, LibraryDescriptor, parse_library_folders};
pub use paths::{SteamDir, game_dir_in_library};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("registry error: {0}")]
    Registry(String),

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("I/O error: {0}")]
    Io(String),
}
