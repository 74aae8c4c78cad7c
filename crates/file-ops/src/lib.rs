//! File operations for mod installation and game removal.
//!
//! Provides directory sizing, additive merge with progress, mod payload
//! lookup inside an extracted archive, and guarded recursive deletion.

mod delete;
mod install;
mod layout;
mod merge;
mod size;

use std::path::PathBuf;

pub use delete::{
    DEFAULT_EXPECTED_FILES, DEFAULT_VALID_NAMES, DeleteStats, DeletionGuard, GuardViolation,
    delete_tree_with_progress,
};
pub use install::{ensure_install_dir, expand_home, is_within};
pub use layout::{
    EXECUTABLE_EXTENSIONS, Executables, PayloadRoot, TARGET_DIRS, TARGET_FILES,
    relocate_executables, relocate_loose_archives, resolve_payload_root,
};
pub use merge::{MergeStats, merge_tree, merge_tree_except};
pub use size::directory_size;

/// Errors produced by file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl FileOpsError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileOpsError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
