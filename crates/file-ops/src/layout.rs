//! Locating the mod payload inside an extracted archive.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use ddmi_report::Reporter;
use walkdir::WalkDir;

use crate::FileOpsError;

/// Top-level directories of a game installation.
pub const TARGET_DIRS: &[&str] = &["game", "characters", "lib", "renpy"];

/// Top-level archive packs of a game installation.
pub const TARGET_FILES: &[&str] = &["audio.rpa", "fonts.rpa", "images.rpa", "scripts.rpa"];

/// Resource fork folders added by macOS archivers.
const IGNORED_DIRS: &[&str] = &["__MACOSX"];

/// Launchers and scripts that belong at the top of the game folder.
pub const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "sh", "py"];

/// Outcome of [`resolve_payload_root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadRoot {
    /// A directory containing one of the target names was found.
    Found(PathBuf),
    /// Nothing matched; the extraction root is used as is.
    Fallback(PathBuf),
}

impl PayloadRoot {
    pub fn path(&self) -> &Path {
        match self {
            PayloadRoot::Found(p) | PayloadRoot::Fallback(p) => p,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PayloadRoot::Found(_))
    }
}

fn is_payload_dir(dir: &Path) -> bool {
    TARGET_DIRS.iter().any(|name| dir.join(name).is_dir())
        || TARGET_FILES.iter().any(|name| dir.join(name).is_file())
}

/// Returns the first directory, breadth first, that directly holds a game
/// top-level name. Siblings are visited in file name order.
pub fn resolve_payload_root(extract_root: &Path, reporter: &dyn Reporter) -> PayloadRoot {
    let mut queue = VecDeque::from([extract_root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        if is_payload_dir(&dir) {
            tracing::debug!(root = %dir.display(), "resolved payload root");
            return PayloadRoot::Found(dir);
        }

        let Ok(read) = fs::read_dir(&dir) else {
            tracing::warn!(dir = %dir.display(), "cannot list directory");
            continue;
        };
        let mut children: Vec<PathBuf> = read
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| !IGNORED_DIRS.iter().any(|n| e.file_name() == *n))
            .map(|e| e.path())
            .collect();
        children.sort();
        queue.extend(children);
    }

    reporter.console("None of the target directories or files found in the extracted path.");
    PayloadRoot::Fallback(extract_root.to_path_buf())
}

/// Moves `*.rpa` packs lying directly in `payload` into `payload/game`.
///
/// Returns how many packs were moved. A pack already present under `game`
/// is replaced.
pub fn relocate_loose_archives(payload: &Path) -> Result<usize, FileOpsError> {
    let loose: Vec<&str> = TARGET_FILES
        .iter()
        .copied()
        .filter(|name| payload.join(name).is_file())
        .collect();
    if loose.is_empty() {
        return Ok(0);
    }

    let game = payload.join("game");
    fs::create_dir_all(&game).map_err(|e| FileOpsError::io("failed to create", &game, e))?;

    for name in &loose {
        let from = payload.join(name);
        let to = game.join(name);
        if to.exists() {
            fs::remove_file(&to).map_err(|e| FileOpsError::io("failed to remove", &to, e))?;
        }
        fs::rename(&from, &to).map_err(|e| FileOpsError::io("failed to move", &from, e))?;
    }

    tracing::info!(count = loose.len(), payload = %payload.display(), "moved loose packs into game/");
    Ok(loose.len())
}

/// Launchers found under the payload by [`relocate_executables`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Executables {
    /// File names that will land at the top of the destination.
    pub names: Vec<String>,
    /// How many of them had to be moved up from a subdirectory.
    pub moved: usize,
}

impl Executables {
    /// True when a Windows launcher is among them.
    pub fn has_exe(&self) -> bool {
        self.names.iter().any(|n| has_extension(n, "exe"))
    }
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

fn is_executable(name: &str) -> bool {
    EXECUTABLE_EXTENSIONS.iter().any(|ext| has_extension(name, ext))
}

/// Game directories and `.app` bundles are merged whole; nothing inside
/// them is relocated.
fn is_opaque_dir(name: &str) -> bool {
    TARGET_DIRS.contains(&name) || IGNORED_DIRS.contains(&name) || has_extension(name, "app")
}

/// Moves executables and scripts found anywhere under `payload` up to
/// `payload` itself, so the merge places them next to the game launcher.
///
/// Directories named in [`TARGET_DIRS`] and `*.app` bundles are not
/// searched. An existing file of the same name is replaced; when two
/// subdirectories hold the same name the last one in file name order wins.
pub fn relocate_executables(
    payload: &Path,
    reporter: &dyn Reporter,
) -> Result<Executables, FileOpsError> {
    let mut found = Vec::new();
    let walker = WalkDir::new(payload)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir() && is_opaque_dir(&e.file_name().to_string_lossy()))
        });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_executable(&name) {
            found.push((entry.depth(), entry.into_path(), name));
        }
    }

    let mut out = Executables::default();
    for (depth, from, name) in found {
        reporter.console(&format!("Moving executable/script: {name}"));
        if depth > 1 {
            let to = payload.join(&name);
            if to.symlink_metadata().is_ok() {
                fs::remove_file(&to).map_err(|e| FileOpsError::io("failed to remove", &to, e))?;
            }
            fs::rename(&from, &to).map_err(|e| FileOpsError::io("failed to move", &from, e))?;
            out.moved += 1;
        }
        if !out.names.contains(&name) {
            out.names.push(name);
        }
    }

    if !out.names.is_empty() {
        tracing::info!(
            count = out.names.len(),
            moved = out.moved,
            payload = %payload.display(),
            "placed executables at payload root"
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use ddmi_report::RecordingReporter;

    use super::*;

    #[test]
    fn root_itself_matches() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("game")).unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert_eq!(root, PayloadRoot::Found(tmp.path().to_path_buf()));
        assert!(rec.console_lines().is_empty());
    }

    #[test]
    fn wrapped_payload_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("MyMod-1.0/inner/game")).unwrap();
        fs::write(tmp.path().join("README.txt"), "hi").unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert!(root.is_found());
        assert_eq!(root.path(), tmp.path().join("MyMod-1.0/inner"));
    }

    #[test]
    fn shallowest_match_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/deep/deeper/game")).unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::write(tmp.path().join("b/scripts.rpa"), "x").unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert_eq!(root.path(), tmp.path().join("b"));
    }

    #[test]
    fn macos_metadata_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("__MACOSX/game")).unwrap();
        fs::create_dir_all(tmp.path().join("mod/characters")).unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert_eq!(root.path(), tmp.path().join("mod"));
    }

    #[test]
    fn rpa_must_be_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("images.rpa")).unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert!(!root.is_found());
    }

    #[test]
    fn falls_back_with_warning() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();

        let rec = RecordingReporter::new();
        let root = resolve_payload_root(tmp.path(), &rec);
        assert_eq!(root, PayloadRoot::Fallback(tmp.path().to_path_buf()));
        assert!(rec.console_contains("None of the target directories"));
    }

    #[test]
    fn loose_packs_move_into_game() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = tmp.path();
        fs::write(payload.join("scripts.rpa"), "new").unwrap();
        fs::write(payload.join("images.rpa"), "img").unwrap();
        fs::create_dir(payload.join("game")).unwrap();
        fs::write(payload.join("game/scripts.rpa"), "old").unwrap();

        assert_eq!(relocate_loose_archives(payload).unwrap(), 2);
        assert!(!payload.join("scripts.rpa").exists());
        assert_eq!(fs::read_to_string(payload.join("game/scripts.rpa")).unwrap(), "new");
        assert_eq!(fs::read_to_string(payload.join("game/images.rpa")).unwrap(), "img");
    }

    #[test]
    fn nothing_to_relocate() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("game")).unwrap();
        assert_eq!(relocate_loose_archives(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn nested_launchers_move_to_payload_root() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = tmp.path();
        fs::create_dir_all(payload.join("tools")).unwrap();
        fs::create_dir_all(payload.join("game/python")).unwrap();
        fs::write(payload.join("tools/Launch.exe"), "exe").unwrap();
        fs::write(payload.join("tools/run.SH"), "sh").unwrap();
        fs::write(payload.join("tools/notes.txt"), "txt").unwrap();
        fs::write(payload.join("game/python/helper.py"), "py").unwrap();
        fs::write(payload.join("start.bat"), "bat").unwrap();

        let rec = RecordingReporter::new();
        let exes = relocate_executables(payload, &rec).unwrap();

        assert_eq!(exes.moved, 2);
        assert!(exes.has_exe());
        assert_eq!(fs::read_to_string(payload.join("Launch.exe")).unwrap(), "exe");
        assert_eq!(fs::read_to_string(payload.join("run.SH")).unwrap(), "sh");
        assert!(payload.join("start.bat").is_file());
        assert!(payload.join("tools/notes.txt").is_file());
        assert!(!payload.join("tools/Launch.exe").exists());
        assert!(payload.join("game/python/helper.py").is_file());
        assert!(!payload.join("helper.py").exists());
        assert!(rec.console_contains("Moving executable/script: Launch.exe"));
    }

    #[test]
    fn app_bundles_are_left_whole() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = tmp.path();
        fs::create_dir_all(payload.join("DDLC.app/Contents/MacOS")).unwrap();
        fs::write(payload.join("DDLC.app/Contents/MacOS/DDLC.sh"), "sh").unwrap();

        let rec = RecordingReporter::new();
        let exes = relocate_executables(payload, &rec).unwrap();

        assert_eq!(exes, Executables::default());
        assert!(payload.join("DDLC.app/Contents/MacOS/DDLC.sh").is_file());
        assert!(rec.console_lines().is_empty());
    }

    #[test]
    fn moved_launcher_replaces_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let payload = tmp.path();
        fs::create_dir_all(payload.join("bin")).unwrap();
        fs::write(payload.join("DDLC.exe"), "old").unwrap();
        fs::write(payload.join("bin/DDLC.exe"), "new").unwrap();

        let rec = RecordingReporter::new();
        let exes = relocate_executables(payload, &rec).unwrap();

        assert_eq!(exes.names, vec!["DDLC.exe".to_string()]);
        assert_eq!(exes.moved, 1);
        assert_eq!(fs::read_to_string(payload.join("DDLC.exe")).unwrap(), "new");
    }
}
