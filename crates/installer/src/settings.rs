//! Installer settings.

use std::path::PathBuf;

use ddmi_file_ops::{DEFAULT_EXPECTED_FILES, DEFAULT_VALID_NAMES, DeletionGuard};
use ddmi_steam::{DDLC_APP_ID, DDLC_FOLDER, GameFinder};
use serde::{Deserialize, Serialize};

/// Knobs for discovery, uninstall guards and install cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Steam app ids that identify the game in a library.
    #[serde(default = "default_app_ids")]
    pub app_ids: Vec<String>,

    /// Folder name under `steamapps/common`.
    #[serde(default = "default_game_folder")]
    pub game_folder: String,

    /// Steam directory, skipping registry or home lookup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_path: Option<PathBuf>,

    /// Tokens one of which the folder name must contain before deletion.
    #[serde(default = "default_valid_names")]
    pub valid_names: Vec<String>,

    /// Entries one of which the folder must contain before deletion.
    #[serde(default = "default_expected_files")]
    pub expected_files: Vec<String>,

    /// Open the destination in the file manager after a successful install.
    #[serde(default = "default_true")]
    pub open_explorer: bool,

    /// Leave the extraction staging directory in place.
    #[serde(default)]
    pub keep_staging: bool,
}

fn default_app_ids() -> Vec<String> {
    vec![DDLC_APP_ID.into()]
}

fn default_game_folder() -> String {
    DDLC_FOLDER.into()
}

fn default_valid_names() -> Vec<String> {
    DEFAULT_VALID_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_expected_files() -> Vec<String> {
    DEFAULT_EXPECTED_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_ids: default_app_ids(),
            game_folder: default_game_folder(),
            steam_path: None,
            valid_names: default_valid_names(),
            expected_files: default_expected_files(),
            open_explorer: default_true(),
            keep_staging: false,
        }
    }
}

impl Settings {
    pub fn game_finder(&self) -> GameFinder {
        let finder = GameFinder::new(self.app_ids.clone(), self.game_folder.clone());
        match &self.steam_path {
            Some(root) => finder.with_steam_root(root),
            None => finder,
        }
    }

    pub fn deletion_guard(&self) -> DeletionGuard {
        DeletionGuard {
            valid_names: self.valid_names.clone(),
            expected_files: self.expected_files.clone(),
        }
    }
}
