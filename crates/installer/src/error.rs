//! Installer error types.

use ddmi_archive::ArchiveError;
use ddmi_file_ops::{FileOpsError, GuardViolation};

/// Errors produced by the install and uninstall pipelines.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("{0}")]
    InputInvalid(String),

    #[error(transparent)]
    ArchiveOpen(ArchiveError),

    #[error(transparent)]
    ArchiveRead(ArchiveError),

    #[error("{0}")]
    Filesystem(String),

    #[error(transparent)]
    GuardRejected(#[from] GuardViolation),

    #[error("cancelled by user")]
    UserDeclined,

    #[error("another operation is still running")]
    Busy,
}

impl From<ArchiveError> for InstallError {
    fn from(e: ArchiveError) -> Self {
        match e {
            ArchiveError::Open { .. } => InstallError::ArchiveOpen(e),
            ArchiveError::Write { .. } => InstallError::Filesystem(e.to_string()),
            ArchiveError::Read { .. } | ArchiveError::UnsafePath(_) => InstallError::ArchiveRead(e),
        }
    }
}

impl From<FileOpsError> for InstallError {
    fn from(e: FileOpsError) -> Self {
        InstallError::Filesystem(e.to_string())
    }
}

impl From<std::io::Error> for InstallError {
    fn from(e: std::io::Error) -> Self {
        InstallError::Filesystem(e.to_string())
    }
}
