use std::fs;
use std::path::{Path, PathBuf};

use crate::ArchiveError;

/// Normalizes an archive member name into a relative path.
///
/// Backslashes become separators, leading separators and `.` segments are
/// dropped, and `..` is resolved lexically. Rejects:
/// - names that resolve above the root (`../x`, `a/../../x`)
/// - drive or device prefixes (`C:`, `\\?\`)
/// - names that resolve to nothing (`/`, `./`)
pub fn normalize_entry_name(name: &str) -> Result<PathBuf, ArchiveError> {
    let unified = name.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(ArchiveError::UnsafePath(format!(
                        "parent directory traversal not allowed: {name}"
                    )));
                }
            }
            s if s.contains(':') => {
                return Err(ArchiveError::UnsafePath(format!(
                    "path prefix not allowed: {name}"
                )));
            }
            s => parts.push(s),
        }
    }

    if parts.is_empty() {
        return Err(ArchiveError::UnsafePath(format!("empty path: {name:?}")));
    }

    Ok(parts.iter().collect())
}

/// Returns true if `target` stays under `root` once symlinks are resolved.
///
/// `root` must already be canonical. The deepest ancestor of `target` that
/// exists is canonicalized and compared, so a link planted inside the
/// destination cannot redirect writes elsewhere.
pub fn is_inside(root: &Path, target: &Path) -> bool {
    let mut probe = target;
    loop {
        if fs::symlink_metadata(probe).is_ok() {
            return fs::canonicalize(probe)
                .map(|resolved| resolved.starts_with(root))
                .unwrap_or(false);
        }
        match probe.parent() {
            Some(parent) => probe = parent,
            None => return false,
        }
    }
}
