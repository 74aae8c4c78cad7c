use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use ddmi_report::{ProgressLedger, Reporter};
use zip::ZipArchive;

use crate::entry_path::{is_inside, normalize_entry_name};
use crate::{ARCHIVE_SUFFIX, ArchiveError};

const COPY_BUFFER: usize = 64 * 1024;

/// One member of a mod archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name as stored in the archive.
    pub name: String,
    /// Normalized relative path, `None` when the name is unsafe.
    pub relative_path: Option<PathBuf>,
    pub uncompressed_size: u64,
    pub is_directory: bool,
}

/// What an extraction run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files_written: usize,
    pub dirs_created: usize,
    pub bytes_written: u64,
    /// Raw names of entries refused by the path guard.
    pub skipped: Vec<String>,
}

/// Returns true if `path` ends in `.zip`, ignoring case.
pub fn has_archive_suffix(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_SUFFIX))
}

/// Sum of uncompressed entry sizes, or `0` if the archive cannot be read.
pub fn measure_archive(path: &Path, reporter: &dyn Reporter) -> u64 {
    match ModArchive::open(path).and_then(|mut archive| archive.uncompressed_size()) {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not measure archive");
            reporter.console(&format!("Error opening zip file: {e}"));
            0
        }
    }
}

/// An open mod archive. The file handle is released on drop.
pub struct ModArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl ModArchive {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let open_err = |message: String| ArchiveError::Open {
            path: path.to_path_buf(),
            message,
        };
        let file = File::open(path).map_err(|e| open_err(e.to_string()))?;
        let zip = ZipArchive::new(file).map_err(|e| open_err(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Lists every member in archive order without decompressing.
    pub fn entries(&mut self) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let mut entries = Vec::with_capacity(self.zip.len());
        for i in 0..self.zip.len() {
            let entry = self.zip.by_index_raw(i).map_err(|e| ArchiveError::Read {
                name: format!("#{i}"),
                message: e.to_string(),
            })?;
            let name = entry.name().to_string();
            entries.push(ArchiveEntry {
                relative_path: normalize_entry_name(&name).ok(),
                uncompressed_size: entry.size(),
                is_directory: entry.is_dir(),
                name,
            });
        }
        Ok(entries)
    }

    /// Sum of the uncompressed sizes of all members.
    pub fn uncompressed_size(&mut self) -> Result<u64, ArchiveError> {
        Ok(self
            .entries()?
            .iter()
            .map(|e| e.uncompressed_size)
            .fold(0u64, u64::saturating_add))
    }

    /// Streams every member into `dest`, in archive order.
    ///
    /// Entries whose path would leave `dest` are reported and skipped; they
    /// do not advance the ledger. Any read or write failure aborts the run.
    pub fn extract_to(
        &mut self,
        dest: &Path,
        ledger: &mut ProgressLedger,
        reporter: &dyn Reporter,
    ) -> Result<ExtractSummary, ArchiveError> {
        fs::create_dir_all(dest).map_err(|source| ArchiveError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        let root = fs::canonicalize(dest).map_err(|source| ArchiveError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut summary = ExtractSummary::default();

        for i in 0..self.zip.len() {
            let mut entry = self.zip.by_index(i).map_err(|e| ArchiveError::Read {
                name: format!("#{i}"),
                message: e.to_string(),
            })?;
            let name = entry.name().to_string();

            let target = match normalize_entry_name(&name) {
                Ok(rel) => root.join(rel),
                Err(e) => {
                    skip_entry(&name, &e.to_string(), &mut summary, reporter);
                    continue;
                }
            };
            if !is_inside(&root, &target) {
                skip_entry(&name, "resolves outside the destination", &mut summary, reporter);
                continue;
            }

            if entry.is_dir() {
                create_dir(&target)?;
                summary.dirs_created += 1;
                ledger.advance(0, reporter);
                continue;
            }

            if let Some(parent) = target.parent() {
                create_dir(parent)?;
            }
            let written = write_entry(&mut entry, &name, &target)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                // Keep the executable bit on launch scripts; the owner must
                // still be able to read it back when merging.
                let perms = fs::Permissions::from_mode((mode & 0o777) | 0o600);
                if let Err(e) = fs::set_permissions(&target, perms) {
                    tracing::debug!(path = %target.display(), error = %e, "mode not applied");
                }
            }

            summary.files_written += 1;
            summary.bytes_written += written;
            ledger.advance(entry.size(), reporter);
        }

        tracing::info!(
            archive = %self.path.display(),
            dest = %dest.display(),
            files = summary.files_written,
            skipped = summary.skipped.len(),
            "archive extracted"
        );
        Ok(summary)
    }
}

fn skip_entry(name: &str, reason: &str, summary: &mut ExtractSummary, reporter: &dyn Reporter) {
    tracing::warn!(entry = name, reason, "skipping archive entry");
    reporter.console(&format!("Warning: skipped unsafe archive entry {name}: {reason}"));
    summary.skipped.push(name.to_string());
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Copies one decompressed entry to `target`, keeping read and write
/// failures apart.
fn write_entry(entry: &mut impl Read, name: &str, target: &Path) -> Result<u64, ArchiveError> {
    let write_err = |source| ArchiveError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut out = File::create(target).map_err(write_err)?;
    let mut buf = vec![0u8; COPY_BUFFER];
    let mut total = 0u64;

    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ArchiveError::Read {
                    name: name.to_string(),
                    message: e.to_string(),
                });
            }
        };
        out.write_all(&buf[..n]).map_err(write_err)?;
        total += n as u64;
    }

    out.flush().map_err(write_err)?;
    Ok(total)
}
