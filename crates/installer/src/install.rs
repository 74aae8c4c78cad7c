//! The install pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use ddmi_archive::{ExtractSummary, ModArchive, measure_archive};
use ddmi_file_ops::{
    Executables, MergeStats, PayloadRoot, directory_size, ensure_install_dir, merge_tree,
    merge_tree_except, relocate_executables, relocate_loose_archives, resolve_payload_root,
};
use ddmi_report::{ProgressLedger, Reporter};

use crate::explorer::reveal_in_file_manager;
use crate::{ERROR_TITLE, InstallError, InstallRequest, Settings};

/// Prefix of the per-archive extraction directory inside the destination.
const STAGING_PREFIX: &str = ".ddmi-staging-";

/// What a successful install did.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub destination: PathBuf,
    pub payload_root: PayloadRoot,
    pub extracted: ExtractSummary,
    pub copied_game: Option<MergeStats>,
    /// Launchers and scripts placed at the top of the destination.
    pub executables: Executables,
    pub merged: MergeStats,
    /// Set when the staging directory was left on disk.
    pub staging: Option<PathBuf>,
}

/// Extraction directory for `archive` under `destination`.
pub fn staging_dir(destination: &Path, archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "mod".into());
    destination.join(format!("{STAGING_PREFIX}{stem}"))
}

/// Installs the mod in `request`, reporting every outcome to `reporter`.
///
/// Invalid input yields one critical dialog and no progress. A failure after
/// that yields a console line and one critical dialog; files already written
/// stay in place. On success progress ends at 100 and a completion notice
/// is shown.
pub fn run_install(
    request: &InstallRequest,
    settings: &Settings,
    reporter: &dyn Reporter,
) -> Result<InstallOutcome, InstallError> {
    if let Err(e) = request.validate() {
        tracing::warn!(error = %e, "install request rejected");
        reporter.critical(ERROR_TITLE, &e.to_string());
        return Err(e);
    }

    let staging = staging_dir(request.destination(), &request.archive_path);
    let result = install(request, &staging, settings, reporter);

    if result.is_err() && !settings.keep_staging {
        remove_staging(&staging, reporter);
    }

    match result {
        Ok(outcome) => {
            reporter.info(
                "Process Completed",
                "All files have been processed successfully.",
            );
            if outcome.payload_root.is_found() && settings.open_explorer {
                if let Err(e) = reveal_in_file_manager(&outcome.destination) {
                    tracing::warn!(error = %e, "file manager did not start");
                    reporter.console(&format!("Warning: could not open file manager: {e}"));
                }
            }
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, "install failed");
            reporter.console(&format!(
                "Error during processing: {e}. Files already written to {} were left in place.",
                request.destination().display()
            ));
            reporter.critical(ERROR_TITLE, &format!("An error occurred: {e}"));
            Err(e)
        }
    }
}

fn install(
    request: &InstallRequest,
    staging: &Path,
    settings: &Settings,
    reporter: &dyn Reporter,
) -> Result<InstallOutcome, InstallError> {
    reporter.console(&format!(
        "Processing files from: {} to {}",
        request.archive_path.display(),
        request.game_path.display()
    ));

    let destination = match &request.separate_mod_path {
        Some(separate) => ensure_install_dir(separate)?,
        None => request.game_path.clone(),
    };

    let game_size = directory_size(&request.game_path, reporter);
    let archive_size = measure_archive(&request.archive_path, reporter);
    let mut ledger = ProgressLedger::new(game_size.saturating_add(archive_size));
    tracing::info!(
        archive = %request.archive_path.display(),
        destination = %destination.display(),
        total = ledger.total(),
        "install started"
    );

    if staging.exists() {
        fs::remove_dir_all(staging)?;
    }
    let extracted = {
        let mut archive = ModArchive::open(&request.archive_path)?;
        archive.extract_to(staging, &mut ledger, reporter)?
    };
    reporter.console(&format!("Extracted zip to: {}", staging.display()));

    let copied_game = match &request.separate_mod_path {
        Some(_) => {
            let stats = merge_tree_except(
                &request.game_path,
                &destination,
                is_staging_entry,
                &mut ledger,
                reporter,
            )?;
            reporter.console(&format!("Copied game files to: {}", destination.display()));
            Some(stats)
        }
        None => None,
    };

    let payload_root = resolve_payload_root(staging, reporter);
    let executables = if payload_root.is_found() {
        relocate_executables(payload_root.path(), reporter)?
    } else {
        Executables::default()
    };
    relocate_loose_archives(payload_root.path())?;
    let merged = merge_tree(payload_root.path(), &destination, &mut ledger, reporter)?;

    let staging = if settings.keep_staging {
        Some(staging.to_path_buf())
    } else {
        remove_staging(staging, reporter);
        None
    };

    ledger.finish(reporter);
    tracing::info!(
        destination = %destination.display(),
        files = merged.files_copied + merged.files_overwritten,
        "install finished"
    );

    Ok(InstallOutcome {
        destination,
        payload_root,
        extracted,
        copied_game,
        executables,
        merged,
        staging,
    })
}

/// Staging trees left in the game directory by earlier runs.
fn is_staging_entry(rel: &Path) -> bool {
    rel.components().count() == 1
        && rel.to_string_lossy().starts_with(STAGING_PREFIX)
}

fn remove_staging(staging: &Path, reporter: &dyn Reporter) {
    if !staging.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(staging) {
        tracing::warn!(path = %staging.display(), error = %e, "staging cleanup failed");
        reporter.console(&format!(
            "Warning: could not remove {}: {e}",
            staging.display()
        ));
    }
}
