//! Install and uninstall request values.

use std::path::{Path, PathBuf};

use ddmi_archive::has_archive_suffix;
use ddmi_file_ops::is_within;

use crate::InstallError;

/// Everything one install needs. Consumed by a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub archive_path: PathBuf,
    pub game_path: PathBuf,
    /// Install here instead, after copying the game files over.
    pub separate_mod_path: Option<PathBuf>,
}

impl InstallRequest {
    pub fn new(archive_path: impl Into<PathBuf>, game_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            game_path: game_path.into(),
            separate_mod_path: None,
        }
    }

    pub fn with_separate_mod_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.separate_mod_path = Some(path.into());
        self
    }

    /// Where the mod ends up.
    pub fn destination(&self) -> &Path {
        self.separate_mod_path.as_deref().unwrap_or(&self.game_path)
    }

    /// Checks the request before any byte is moved.
    pub fn validate(&self) -> Result<(), InstallError> {
        if is_blank(&self.archive_path) || is_blank(&self.game_path) {
            return Err(invalid("Please specify both the ZIP file and the game directory."));
        }
        if let Some(separate) = &self.separate_mod_path {
            if is_blank(separate) {
                return Err(invalid("Please specify the mod directory."));
            }
        }
        if !has_archive_suffix(&self.archive_path) {
            return Err(invalid("The provided path does not point to a zip file."));
        }
        if !self.archive_path.is_file() {
            return Err(invalid(format!(
                "The mod archive does not exist: {}",
                self.archive_path.display()
            )));
        }
        if !self.game_path.is_dir() {
            return Err(invalid(format!(
                "The game directory does not exist: {}",
                self.game_path.display()
            )));
        }
        if let Some(separate) = &self.separate_mod_path {
            if separate.is_file() {
                return Err(invalid(format!(
                    "The mod directory is a file: {}",
                    separate.display()
                )));
            }
            if is_within(separate, &self.game_path) {
                return Err(invalid(
                    "The mod directory must not be inside the game directory.",
                ));
            }
        }
        Ok(())
    }
}

/// Target of an uninstall. Destructive; see [`DeletionGuard`](ddmi_file_ops::DeletionGuard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallRequest {
    pub game_path: PathBuf,
}

impl UninstallRequest {
    pub fn new(game_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
        }
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

fn invalid(message: impl Into<String>) -> InstallError {
    InstallError::InputInvalid(message.into())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    struct Fixture {
        _tmp: tempfile::TempDir,
        archive: PathBuf,
        game: PathBuf,
        root: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let archive = root.join("mod.zip");
        fs::write(&archive, b"PK").unwrap();
        let game = root.join("Doki Doki Literature Club");
        fs::create_dir(&game).unwrap();
        Fixture {
            _tmp: tmp,
            archive,
            game,
            root,
        }
    }

    fn message(err: InstallError) -> String {
        match err {
            InstallError::InputInvalid(msg) => msg,
            other => panic!("expected InputInvalid, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_passes() {
        let f = fixture();
        let req = InstallRequest::new(&f.archive, &f.game);
        assert!(req.validate().is_ok());
        assert_eq!(req.destination(), f.game.as_path());
    }

    #[test]
    fn separate_path_becomes_destination() {
        let f = fixture();
        let sep = f.root.join("modded");
        let req = InstallRequest::new(&f.archive, &f.game).with_separate_mod_path(&sep);
        assert!(req.validate().is_ok());
        assert_eq!(req.destination(), sep.as_path());
    }

    #[test]
    fn empty_paths_rejected() {
        let f = fixture();
        let msg = message(InstallRequest::new("", &f.game).validate().unwrap_err());
        assert_eq!(msg, "Please specify both the ZIP file and the game directory.");

        let msg = message(
            InstallRequest::new(&f.archive, &f.game)
                .with_separate_mod_path("  ")
                .validate()
                .unwrap_err(),
        );
        assert_eq!(msg, "Please specify the mod directory.");
    }

    #[test]
    fn wrong_suffix_rejected() {
        let f = fixture();
        let rar = f.root.join("mod.rar");
        fs::write(&rar, b"Rar!").unwrap();
        let msg = message(InstallRequest::new(&rar, &f.game).validate().unwrap_err());
        assert!(msg.contains("zip file"));
    }

    #[test]
    fn missing_inputs_rejected() {
        let f = fixture();
        let err = InstallRequest::new(f.root.join("gone.zip"), &f.game)
            .validate()
            .unwrap_err();
        assert!(message(err).contains("does not exist"));

        let err = InstallRequest::new(&f.archive, f.root.join("nope"))
            .validate()
            .unwrap_err();
        assert!(message(err).contains("does not exist"));
    }

    #[test]
    fn separate_inside_game_rejected() {
        let f = fixture();
        let err = InstallRequest::new(&f.archive, &f.game)
            .with_separate_mod_path(f.game.join("mods"))
            .validate()
            .unwrap_err();
        assert!(message(err).contains("inside the game directory"));
    }
}
