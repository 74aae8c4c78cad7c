//! Install and uninstall pipelines for Doki Doki Literature Club mods.
//!
//! Every entry point takes a [`Reporter`](ddmi_report::Reporter) and
//! reports its own failures, so a front-end only has to render events.
//! [`Worker`] runs one pipeline at a time on a background thread.

mod error;
mod explorer;
mod install;
mod request;
mod settings;
mod uninstall;
mod worker;

pub use error::InstallError;
pub use explorer::reveal_in_file_manager;
pub use install::{InstallOutcome, run_install, staging_dir};
pub use request::{InstallRequest, UninstallRequest};
pub use settings::Settings;
pub use uninstall::run_uninstall;
pub use worker::{Job, Worker, WorkerState};

/// Title of every error dialog.
pub const ERROR_TITLE: &str = "Error";
