//! Guarded game directory deletion.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ddmi_report::{ProgressLedger, Reporter};
use walkdir::WalkDir;

use crate::FileOpsError;

/// Default folder name token of a game installation.
pub const DEFAULT_VALID_NAMES: &[&str] = &["Doki Doki Literature Club"];

/// Default marker entries, at least one of which a game directory holds.
pub const DEFAULT_EXPECTED_FILES: &[&str] = &["DDLC.exe", "DDLC.sh", "game"];

/// Reason [`DeletionGuard::check`] refused a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    EmptyPath,
    UnrecognizedName(PathBuf),
    MissingGameFiles(PathBuf),
    /// The path is a symbolic link; only the real directory may be removed.
    Symlink(PathBuf),
}

impl GuardViolation {
    /// Line written to the console next to the dialog, if any.
    pub fn console_line(&self) -> Option<&'static str> {
        match self {
            GuardViolation::EmptyPath => None,
            GuardViolation::UnrecognizedName(_) => {
                Some("Error: Attempted to delete a non-DDLC directory.")
            }
            GuardViolation::MissingGameFiles(_) => {
                Some("Error: The specified directory lacks expected DDLC files.")
            }
            GuardViolation::Symlink(_) => {
                Some("Error: The specified directory is a symbolic link.")
            }
        }
    }
}

impl fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardViolation::EmptyPath => {
                f.write_str("Game directory is empty. Please specify a valid path.")
            }
            GuardViolation::UnrecognizedName(_) => {
                f.write_str("The specified directory does not appear to be a valid DDLC installation.")
            }
            GuardViolation::MissingGameFiles(_) => {
                f.write_str("The specified directory does not contain expected DDLC files.")
            }
            GuardViolation::Symlink(_) => f.write_str(
                "The specified directory is a link. Please specify the DDLC installation it points to.",
            ),
        }
    }
}

impl std::error::Error for GuardViolation {}

/// Name and content heuristics a directory must pass before deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionGuard {
    pub valid_names: Vec<String>,
    pub expected_files: Vec<String>,
}

impl Default for DeletionGuard {
    fn default() -> Self {
        Self {
            valid_names: DEFAULT_VALID_NAMES.iter().map(|s| s.to_string()).collect(),
            expected_files: DEFAULT_EXPECTED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DeletionGuard {
    /// Checks `path` without touching the filesystem beyond existence probes.
    pub fn check(&self, path: &Path) -> Result<(), GuardViolation> {
        if path.as_os_str().is_empty() {
            return Err(GuardViolation::EmptyPath);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.valid_names.iter().any(|token| name.contains(token.as_str())) {
            return Err(GuardViolation::UnrecognizedName(path.to_path_buf()));
        }

        // Rebuilt from components so a trailing separator cannot resolve the link.
        let bare: PathBuf = path.components().collect();
        if fs::symlink_metadata(&bare).is_ok_and(|m| m.file_type().is_symlink()) {
            return Err(GuardViolation::Symlink(path.to_path_buf()));
        }

        if !self.expected_files.iter().any(|f| path.join(f).exists()) {
            return Err(GuardViolation::MissingGameFiles(path.to_path_buf()));
        }

        Ok(())
    }
}

/// Counters from one deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteStats {
    pub files_removed: usize,
    pub dirs_removed: usize,
    pub bytes: u64,
}

/// Removes `path` and everything beneath it, advancing `ledger` per file.
///
/// Files and links go first, then directories deepest first, then `path`
/// itself. The first error stops the run and leaves the rest in place.
/// A symbolic link to a directory is refused, not unlinked.
pub fn delete_tree_with_progress(
    path: &Path,
    ledger: &mut ProgressLedger,
    reporter: &dyn Reporter,
) -> Result<DeleteStats, FileOpsError> {
    let bare: PathBuf = path.components().collect();
    if !fs::symlink_metadata(&bare).is_ok_and(|m| m.is_dir()) {
        return Err(FileOpsError::NotADirectory(path.to_path_buf()));
    }

    let entries: Vec<walkdir::DirEntry> = WalkDir::new(path)
        .follow_links(false)
        .contents_first(true)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<_, _>>()?;

    let mut stats = DeleteStats::default();

    for entry in entries.iter().filter(|e| !e.file_type().is_dir()) {
        let size = if entry.file_type().is_file() {
            entry.metadata().map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };
        remove_file(entry.path())?;
        stats.files_removed += 1;
        stats.bytes += size;
        ledger.advance(size, reporter);
    }

    for entry in entries.iter().filter(|e| e.file_type().is_dir()) {
        fs::remove_dir(entry.path())
            .map_err(|e| FileOpsError::io("failed to remove directory", entry.path(), e))?;
        stats.dirs_removed += 1;
    }

    tracing::info!(
        path = %path.display(),
        files = stats.files_removed,
        dirs = stats.dirs_removed,
        "deleted game directory"
    );
    Ok(stats)
}

fn remove_file(path: &Path) -> Result<(), FileOpsError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        #[cfg(windows)]
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            // Read-only files cannot be removed on Windows until the flag is cleared.
            let mut perms = fs::metadata(path)
                .map_err(|e| FileOpsError::io("failed to stat", path, e))?
                .permissions();
            perms.set_readonly(false);
            fs::set_permissions(path, perms)
                .map_err(|e| FileOpsError::io("failed to clear read-only flag", path, e))?;
            fs::remove_file(path).map_err(|e| FileOpsError::io("failed to remove", path, e))
        }
        Err(e) => Err(FileOpsError::io("failed to remove", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use ddmi_report::RecordingReporter;

    use super::*;

    fn game_dir(root: &Path) -> PathBuf {
        let dir = root.join("Doki Doki Literature Club");
        fs::create_dir_all(dir.join("game/saves")).unwrap();
        fs::write(dir.join("DDLC.exe"), [0u8; 10]).unwrap();
        fs::write(dir.join("game/scripts.rpa"), [0u8; 30]).unwrap();
        fs::write(dir.join("game/saves/persistent"), [0u8; 10]).unwrap();
        dir
    }

    #[test]
    fn guard_accepts_game_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = game_dir(tmp.path());
        assert_eq!(DeletionGuard::default().check(&dir), Ok(()));
    }

    #[test]
    fn guard_rejects_empty_path() {
        let err = DeletionGuard::default().check(Path::new("")).unwrap_err();
        assert_eq!(err, GuardViolation::EmptyPath);
        assert_eq!(err.console_line(), None);
        assert!(err.to_string().contains("Please specify a valid path"));
    }

    #[test]
    fn guard_rejects_unrelated_name() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("Documents");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("DDLC.exe"), "x").unwrap();

        let err = DeletionGuard::default().check(&docs).unwrap_err();
        assert!(matches!(err, GuardViolation::UnrecognizedName(_)));
        assert_eq!(
            err.console_line(),
            Some("Error: Attempted to delete a non-DDLC directory.")
        );
    }

    #[test]
    fn guard_checks_basename_only() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("Doki Doki Literature Club/Documents");
        fs::create_dir_all(nested.join("game")).unwrap();

        let err = DeletionGuard::default().check(&nested).unwrap_err();
        assert!(matches!(err, GuardViolation::UnrecognizedName(_)));
    }

    #[test]
    fn guard_rejects_missing_markers() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Doki Doki Literature Club");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let err = DeletionGuard::default().check(&dir).unwrap_err();
        assert!(matches!(err, GuardViolation::MissingGameFiles(_)));
        assert!(dir.join("notes.txt").exists());
    }

    #[test]
    fn guard_uses_configured_lists() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("DDLC Plus");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("DDLCPlus.exe"), "x").unwrap();

        let guard = DeletionGuard {
            valid_names: vec!["DDLC Plus".into()],
            expected_files: vec!["DDLCPlus.exe".into()],
        };
        assert_eq!(guard.check(&dir), Ok(()));
        assert!(DeletionGuard::default().check(&dir).is_err());
    }

    #[test]
    fn deletes_everything_with_progress() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = game_dir(tmp.path());

        let rec = RecordingReporter::new();
        let mut ledger = ProgressLedger::new(50);
        let stats = delete_tree_with_progress(&dir, &mut ledger, &rec).unwrap();

        assert!(!dir.exists());
        assert!(tmp.path().exists());
        assert_eq!(stats.files_removed, 3);
        assert_eq!(stats.dirs_removed, 3);
        assert_eq!(stats.bytes, 50);

        let progress = rec.progress_values();
        assert_eq!(progress.len(), 3);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn empty_directory_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("empty");
        fs::create_dir(&dir).unwrap();

        let rec = RecordingReporter::new();
        let mut ledger = ProgressLedger::new(0);
        let stats = delete_tree_with_progress(&dir, &mut ledger, &rec).unwrap();
        assert_eq!(stats.dirs_removed, 1);
        assert!(!dir.exists());
        assert!(rec.progress_values().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn links_removed_without_touching_target() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tmp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), "keep").unwrap();

        let dir = game_dir(tmp.path());
        std::os::unix::fs::symlink(&outside, dir.join("linked")).unwrap();

        let rec = RecordingReporter::new();
        let mut ledger = ProgressLedger::new(50);
        delete_tree_with_progress(&dir, &mut ledger, &rec).unwrap();

        assert!(!dir.exists());
        assert_eq!(fs::read_to_string(outside.join("keep.txt")).unwrap(), "keep");
    }

    #[cfg(unix)]
    #[test]
    fn guard_rejects_linked_game_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let real = game_dir(&tmp.path().join("real"));
        let link = tmp.path().join("Doki Doki Literature Club");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let err = DeletionGuard::default().check(&link).unwrap_err();
        assert_eq!(err, GuardViolation::Symlink(link.clone()));
        assert_eq!(
            err.console_line(),
            Some("Error: The specified directory is a symbolic link.")
        );

        let rec = RecordingReporter::new();
        let mut ledger = ProgressLedger::new(50);
        let err = delete_tree_with_progress(&link, &mut ledger, &rec).unwrap_err();
        assert!(matches!(err, FileOpsError::NotADirectory(_)));
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert!(real.join("DDLC.exe").is_file());
        assert!(rec.progress_values().is_empty());
    }

    #[test]
    fn missing_directory_is_error() {
        let rec = RecordingReporter::new();
        let mut ledger = ProgressLedger::new(1);
        let err = delete_tree_with_progress(Path::new("/no/such/dir"), &mut ledger, &rec)
            .unwrap_err();
        assert!(matches!(err, FileOpsError::NotADirectory(_)));
    }
}
