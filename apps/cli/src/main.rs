//! DDLC mod installer entry point.

mod config;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ddmi_file_ops::expand_home;
use ddmi_installer::{InstallRequest, Job, Settings, UninstallRequest, Worker, WorkerState};
use ddmi_report::{ReportEvent, Reporter, UiMessage, channel};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::terminal::Terminal;

#[derive(Debug, Parser)]
#[command(name = "ddmi", version, about = "Install Doki Doki Literature Club mods")]
struct Cli {
    /// Print every event as one JSON object per line.
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Locate the game through the Steam libraries.
    Detect,

    /// Install a mod archive.
    Install {
        /// Mod archive (.zip).
        archive: String,

        /// Game directory; detected automatically when omitted.
        #[arg(long)]
        game: Option<String>,

        /// Install into this directory, copying the game there first.
        #[arg(long)]
        separate: Option<String>,
    },

    /// Delete the game directory.
    Uninstall {
        /// Game directory; detected automatically when omitted.
        #[arg(long)]
        game: Option<String>,

        /// Answer the confirmation prompt with yes.
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting ddmi");

    let config = Config::load(cli.config.as_deref())?;
    let assume_yes = matches!(cli.command, Command::Uninstall { yes: true, .. });

    let (reporter, mut rx) = channel();
    let reporter = Arc::new(reporter);
    let settings = config.installer;

    let stdin = std::io::stdin();
    let mut terminal = Terminal::new(std::io::stdout(), stdin.lock(), cli.json, assume_yes);

    let succeeded = match plan(cli.command, &settings, &*reporter) {
        Plan::Finished(found) => found,
        Plan::Run(job) => {
            let mut worker = Worker::new(settings, reporter.clone());
            match worker.start(job) {
                Ok(()) => {
                    // The worker's final event is `busy(false)`.
                    while let Some(message) = rx.blocking_recv() {
                        let last = matches!(
                            message,
                            UiMessage::Event(ReportEvent::Busy { busy: false })
                        );
                        terminal.handle(message)?;
                        if last {
                            break;
                        }
                    }
                    worker.wait() == WorkerState::Done
                }
                Err(e) => {
                    tracing::debug!(error = %e, "job did not start");
                    false
                }
            }
        }
    };

    while let Ok(message) = rx.try_recv() {
        terminal.handle(message)?;
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What the main thread does after resolving the command line.
#[derive(Debug)]
enum Plan {
    /// Nothing left to run; carries whether the command succeeded.
    Finished(bool),
    Run(Job),
}

/// Resolves `command` into a job, running game detection when no game
/// directory was given.
fn plan(command: Command, settings: &Settings, reporter: &dyn Reporter) -> Plan {
    let located = |game: Option<String>| -> Option<PathBuf> {
        match game {
            Some(game) => Some(expand_home(&game)),
            None => settings.game_finder().find(reporter).path().map(PathBuf::from),
        }
    };

    match command {
        Command::Detect => {
            let location = settings.game_finder().find(reporter);
            reporter.console(&location.to_string());
            Plan::Finished(location.path().is_some())
        }
        Command::Install {
            archive,
            game,
            separate,
        } => {
            let Some(game) = located(game) else {
                return Plan::Finished(false);
            };
            let mut request = InstallRequest::new(expand_home(&archive), game);
            if let Some(separate) = separate {
                request = request.with_separate_mod_path(expand_home(&separate));
            }
            Plan::Run(Job::Install(request))
        }
        Command::Uninstall { game, .. } => match located(game) {
            Some(game) => Plan::Run(Job::Uninstall(UninstallRequest::new(game))),
            None => Plan::Finished(false),
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_install_with_separate_dir() {
        let cli = Cli::try_parse_from([
            "ddmi",
            "install",
            "mod.zip",
            "--game",
            "/games/ddlc",
            "--separate",
            "/games/modded",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Install {
                archive,
                game,
                separate,
            } => {
                assert_eq!(archive, "mod.zip");
                assert_eq!(game.as_deref(), Some("/games/ddlc"));
                assert_eq!(separate.as_deref(), Some("/games/modded"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn uninstall_defaults_to_prompting() {
        let cli = Cli::try_parse_from(["ddmi", "uninstall"]).unwrap();
        assert!(matches!(cli.command, Command::Uninstall { game: None, yes: false }));
    }

    #[test]
    fn explicit_game_dir_skips_detection() {
        let reporter = ddmi_report::RecordingReporter::new();
        let cli = Cli::try_parse_from(["ddmi", "uninstall", "--game", "/games/ddlc"]).unwrap();

        match plan(cli.command, &Settings::default(), &reporter) {
            Plan::Run(Job::Uninstall(request)) => {
                assert_eq!(request.game_path, PathBuf::from("/games/ddlc"));
            }
            other => panic!("unexpected plan {other:?}"),
        }
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn detect_takes_no_arguments() {
        assert!(Cli::try_parse_from(["ddmi", "detect", "extra"]).is_err());
    }
}
