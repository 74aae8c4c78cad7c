//! Destination path preparation.

use std::path::{Path, PathBuf};

use crate::FileOpsError;

/// Ensures the destination directory exists, creating it if necessary.
///
/// Returns the canonicalized path.
pub fn ensure_install_dir(path: &Path) -> Result<PathBuf, FileOpsError> {
    std::fs::create_dir_all(path)
        .map_err(|e| FileOpsError::io("failed to create install directory", path, e))?;

    let canon = std::fs::canonicalize(path)
        .map_err(|e| FileOpsError::io("failed to canonicalize", path, e))?;
    if !canon.is_dir() {
        return Err(FileOpsError::NotADirectory(canon));
    }
    Ok(canon)
}

/// Reports whether `child` is `parent` or lies beneath it.
///
/// Paths need not exist: the deepest existing ancestor of each is
/// canonicalized, so `..` segments and symlinks do not hide nesting.
pub fn is_within(child: &Path, parent: &Path) -> bool {
    resolve(child).starts_with(resolve(parent))
}

fn resolve(path: &Path) -> PathBuf {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = abs.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(mut canon) = std::fs::canonicalize(existing) {
            canon.extend(rest.iter().rev());
            return canon;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                existing = parent;
            }
            _ => return abs.clone(),
        }
    }
}

/// Expands a `~` prefix to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}
