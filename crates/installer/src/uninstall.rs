//! The uninstall pipeline.

use ddmi_file_ops::{DeleteStats, delete_tree_with_progress, directory_size};
use ddmi_report::{ProgressLedger, Reporter};

use crate::{ERROR_TITLE, InstallError, Settings, UninstallRequest};

const CONFIRM_TITLE: &str = "Confirm Uninstall";
const CONFIRM_MESSAGE: &str =
    "Are you sure you want to Uninstall DDLC? This action cannot be undone!";

/// Deletes the game directory in `request` after the guards pass and the
/// user confirms.
///
/// Nothing on disk changes unless every guard passes and `confirm` returns
/// true. A failure mid-deletion leaves the rest of the tree in place.
pub fn run_uninstall(
    request: &UninstallRequest,
    settings: &Settings,
    reporter: &dyn Reporter,
) -> Result<DeleteStats, InstallError> {
    let path = &request.game_path;

    if let Err(violation) = settings.deletion_guard().check(path) {
        tracing::warn!(path = %path.display(), reason = %violation, "uninstall refused");
        reporter.critical(ERROR_TITLE, &violation.to_string());
        if let Some(line) = violation.console_line() {
            reporter.console(line);
        }
        return Err(violation.into());
    }

    if !reporter.confirm(CONFIRM_TITLE, CONFIRM_MESSAGE) {
        reporter.console("Uninstallation cancelled.");
        return Err(InstallError::UserDeclined);
    }

    let mut ledger = ProgressLedger::new(directory_size(path, reporter));
    reporter.progress(0);

    let stats = match delete_tree_with_progress(path, &mut ledger, reporter) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "uninstall failed");
            reporter.console(&format!("Error during uninstallation: {e}"));
            reporter.critical(ERROR_TITLE, &format!("Failed to uninstall DDLC. {e}"));
            return Err(e.into());
        }
    };

    ledger.finish(reporter);
    reporter.console(&format!(
        "DDLC has been uninstalled successfully from: {}",
        path.display()
    ));
    reporter.info("Uninstall Complete", "DDLC has been successfully uninstalled.");
    reporter.clear_game_path();
    Ok(stats)
}
