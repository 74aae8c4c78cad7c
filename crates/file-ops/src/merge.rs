//! Additive merge of one directory tree onto another.

use std::fs;
use std::path::Path;

use ddmi_report::{ProgressLedger, Reporter};
use walkdir::{DirEntry, WalkDir};

use crate::FileOpsError;

/// Counters from one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub files_overwritten: usize,
    pub links_copied: usize,
    pub bytes: u64,
}

/// Copies every entry of `src` onto `dst`, overwriting what is already there.
///
/// Directories are created first, then files, each level in file name
/// order. Files already in `dst` but absent from `src` are left alone.
/// Symlinks are recreated as links. The ledger advances by each source
/// file's size.
pub fn merge_tree(
    src: &Path,
    dst: &Path,
    ledger: &mut ProgressLedger,
    reporter: &dyn Reporter,
) -> Result<MergeStats, FileOpsError> {
    merge_tree_except(src, dst, |_| false, ledger, reporter)
}

/// Like [`merge_tree`], but entries for which `skip` returns true are left
/// out together with everything beneath them. `skip` receives the path
/// relative to `src`.
pub fn merge_tree_except(
    src: &Path,
    dst: &Path,
    skip: impl Fn(&Path) -> bool,
    ledger: &mut ProgressLedger,
    reporter: &dyn Reporter,
) -> Result<MergeStats, FileOpsError> {
    if !src.is_dir() {
        return Err(FileOpsError::NotADirectory(src.to_path_buf()));
    }

    // Snapshot first so that writes into `dst` never feed back into the walk.
    let entries: Vec<DirEntry> = WalkDir::new(src)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.path().strip_prefix(src).is_ok_and(&skip))
        .collect::<Result<_, _>>()?;

    let mut stats = MergeStats::default();

    fs::create_dir_all(dst).map_err(|e| FileOpsError::io("failed to create", dst, e))?;

    for entry in entries.iter().filter(|e| e.file_type().is_dir()) {
        let target = dst.join(relative(src, entry.path())?);
        if let Ok(meta) = fs::symlink_metadata(&target) {
            if meta.is_dir() {
                continue;
            }
            remove_existing(&target)?;
        }
        fs::create_dir_all(&target).map_err(|e| FileOpsError::io("failed to create", &target, e))?;
        stats.dirs_created += 1;
    }

    for entry in entries.iter().filter(|e| !e.file_type().is_dir()) {
        let source = entry.path();
        let target = dst.join(relative(src, source)?);
        let size = entry
            .metadata()
            .map(|m| m.len())
            .map_err(FileOpsError::Walk)?;

        let existed = fs::symlink_metadata(&target).is_ok();
        if existed {
            reporter.console(&format!("Overwriting file: {}", target.display()));
            remove_existing(&target)?;
        } else {
            reporter.console(&format!("Copying file: {}", target.display()));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FileOpsError::io("failed to create", parent, e))?;
        }

        if entry.file_type().is_symlink() {
            copy_symlink(source, &target)?;
            stats.links_copied += 1;
        } else {
            fs::copy(source, &target).map_err(|e| FileOpsError::io("failed to copy", source, e))?;
            if existed {
                stats.files_overwritten += 1;
            } else {
                stats.files_copied += 1;
            }
        }

        stats.bytes += size;
        ledger.advance(size, reporter);
    }

    tracing::debug!(
        src = %src.display(),
        dst = %dst.display(),
        copied = stats.files_copied,
        overwritten = stats.files_overwritten,
        "merge finished"
    );
    Ok(stats)
}

fn relative<'a>(root: &Path, path: &'a Path) -> Result<&'a Path, FileOpsError> {
    path.strip_prefix(root)
        .map_err(|e| FileOpsError::io("failed to relativize", path, std::io::Error::other(e)))
}

/// Removes whatever sits at `path` so a fresh copy can take its place.
fn remove_existing(path: &Path) -> Result<(), FileOpsError> {
    let meta = fs::symlink_metadata(path).map_err(|e| FileOpsError::io("failed to stat", path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| FileOpsError::io("failed to remove", path, e))
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> Result<(), FileOpsError> {
    let link = fs::read_link(source).map_err(|e| FileOpsError::io("failed to read link", source, e))?;
    std::os::unix::fs::symlink(&link, target)
        .map_err(|e| FileOpsError::io("failed to create link", target, e))
}

#[cfg(windows)]
fn copy_symlink(source: &Path, target: &Path) -> Result<(), FileOpsError> {
    let link = fs::read_link(source).map_err(|e| FileOpsError::io("failed to read link", source, e))?;
    let points_to_dir = fs::metadata(source).map(|m| m.is_dir()).unwrap_or(false);
    let result = if points_to_dir {
        std::os::windows::fs::symlink_dir(&link, target)
    } else {
        std::os::windows::fs::symlink_file(&link, target)
    };
    result.map_err(|e| FileOpsError::io("failed to create link", target, e))
}

#[cfg(not(any(unix, windows)))]
fn copy_symlink(source: &Path, target: &Path) -> Result<(), FileOpsError> {
    fs::copy(source, target)
        .map(|_| ())
        .map_err(|e| FileOpsError::io("failed to copy", source, e))
}
