use std::fs;
use std::path::Path;

use ddmi_report::Reporter;
use walkdir::WalkDir;

/// Returns the total size of all regular files under `path`.
///
/// Symlinks to files are followed, symlinks to directories are not.
/// Unreadable subtrees are skipped with a console warning.
pub fn directory_size(path: &Path, reporter: &dyn Reporter) -> u64 {
    let mut total = 0u64;

    for entry in WalkDir::new(path).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let at = e.path().unwrap_or(path).display().to_string();
                tracing::warn!(path = %at, error = %e, "skipping unreadable entry");
                reporter.console(&format!("Warning: skipped {at}: {e}"));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => total = total.saturating_add(meta.len()),
                Err(e) => {
                    reporter.console(&format!("Warning: skipped {}: {e}", entry.path().display()));
                }
            }
        } else if file_type.is_symlink() {
            if let Ok(meta) = fs::metadata(entry.path()) {
                if meta.is_file() {
                    total = total.saturating_add(meta.len());
                }
            }
        }
    }

    total
}
