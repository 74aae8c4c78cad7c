//! Reading mod archives: uncompressed size measurement and streaming
//! extraction that refuses entries escaping the destination.

mod entry_path;
mod reader;

use std::path::PathBuf;

pub use entry_path::{is_inside, normalize_entry_name};
pub use reader::{ArchiveEntry, ExtractSummary, ModArchive, has_archive_suffix, measure_archive};

/// Suffix accepted for mod archives (compared case-insensitively).
pub const ARCHIVE_SUFFIX: &str = "zip";

/// Errors produced by the archive crate.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open archive {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },

    #[error("failed to read archive entry {name}: {message}")]
    Read { name: String, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsafe entry path: {0}")]
    UnsafePath(String),
}
