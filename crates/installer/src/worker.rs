//! Background worker running one pipeline at a time.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use ddmi_report::Reporter;

use crate::{
    ERROR_TITLE, InstallError, InstallRequest, Settings, UninstallRequest, run_install,
    run_uninstall,
};

const STOPPED_LINE: &str = "Error: the background worker stopped unexpectedly.";

/// Unit of work handed to a [`Worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Install(InstallRequest),
    Uninstall(UninstallRequest),
}

/// Lifecycle of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Done,
    Failed,
}

/// Runs jobs on a dedicated thread and reports against a shared reporter.
///
/// Busy is toggled on around every job, and `busy(false)` is the last event
/// a job emits, even when it panics. A new job starts only when the previous
/// one has been waited for.
pub struct Worker {
    settings: Arc<Settings>,
    reporter: Arc<dyn Reporter>,
    state: Arc<Mutex<WorkerState>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn new(settings: Settings, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            settings: Arc::new(settings),
            reporter,
            state: Arc::new(Mutex::new(WorkerState::Idle)),
            handle: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts `job` in the background.
    ///
    /// Install input is validated first, on the calling thread; an invalid
    /// request is reported as one critical dialog and no thread is spawned.
    pub fn start(&mut self, job: Job) -> Result<(), InstallError> {
        if self.state() != WorkerState::Idle {
            return Err(InstallError::Busy);
        }

        if let Job::Install(request) = &job {
            if let Err(e) = request.validate() {
                tracing::warn!(error = %e, "install request rejected");
                self.reporter.critical(ERROR_TITLE, &e.to_string());
                return Err(e);
            }
        }

        self.set_state(WorkerState::Running);
        self.reporter.busy(true);

        let settings = Arc::clone(&self.settings);
        let reporter = Arc::clone(&self.reporter);
        let state = Arc::clone(&self.state);

        let spawned = std::thread::Builder::new()
            .name("ddmi-worker".into())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| match &job {
                    Job::Install(request) => run_install(request, &settings, &*reporter).map(|_| ()),
                    Job::Uninstall(request) => {
                        run_uninstall(request, &settings, &*reporter).map(|_| ())
                    }
                }));
                let end = match result {
                    Ok(Ok(())) => WorkerState::Done,
                    Ok(Err(e)) => {
                        tracing::debug!(error = %e, "job ended with error");
                        WorkerState::Failed
                    }
                    Err(_) => {
                        tracing::error!("worker job panicked");
                        reporter.console(STOPPED_LINE);
                        WorkerState::Failed
                    }
                };
                *state.lock().unwrap_or_else(PoisonError::into_inner) = end;
                reporter.busy(false);
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.set_state(WorkerState::Idle);
                self.reporter.busy(false);
                self.reporter.console(&format!("Error: {e}"));
                Err(InstallError::from(e))
            }
        }
    }

    /// Blocks until the running job ends and returns how it ended.
    ///
    /// The worker is idle again afterwards.
    pub fn wait(&mut self) -> WorkerState {
        let Some(handle) = self.handle.take() else {
            return self.state();
        };

        if handle.join().is_err() {
            tracing::error!("worker thread panicked");
            self.reporter.console(STOPPED_LINE);
            self.reporter.busy(false);
            self.set_state(WorkerState::Failed);
        }

        let end = self.state();
        self.set_state(WorkerState::Idle);
        end
    }

    /// Starts `job` and waits for it.
    pub fn run(&mut self, job: Job) -> Result<WorkerState, InstallError> {
        self.start(job)?;
        Ok(self.wait())
    }

    fn set_state(&self, next: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ddmi_report::{RecordingReporter, ReportEvent};

    use super::*;

    fn worker(rec: &Arc<RecordingReporter>) -> Worker {
        let settings = Settings {
            open_explorer: false,
            ..Settings::default()
        };
        Worker::new(settings, rec.clone())
    }

    #[test]
    fn invalid_install_never_starts() {
        let rec = Arc::new(RecordingReporter::new());
        let mut w = worker(&rec);

        let err = w
            .start(Job::Install(InstallRequest::new("mod.rar", "game")))
            .unwrap_err();

        assert!(matches!(err, InstallError::InputInvalid(_)));
        assert_eq!(w.state(), WorkerState::Idle);
        assert_eq!(rec.criticals().len(), 1);
        assert!(!rec.events().iter().any(|e| matches!(e, ReportEvent::Busy { .. })));
    }

    #[test]
    fn failed_job_restores_busy_and_returns_to_idle() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("Documents");
        fs::create_dir(&docs).unwrap();

        let rec = Arc::new(RecordingReporter::new());
        let mut w = worker(&rec);
        let end = w.run(Job::Uninstall(UninstallRequest::new(&docs))).unwrap();

        assert_eq!(end, WorkerState::Failed);
        assert_eq!(w.state(), WorkerState::Idle);
        let busy: Vec<bool> = rec
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Busy { busy } => Some(busy),
                _ => None,
            })
            .collect();
        assert_eq!(busy, vec![true, false]);
        assert!(docs.is_dir());
    }

    #[test]
    fn successful_job_is_done() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Doki Doki Literature Club");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("DDLC.exe"), b"x").unwrap();

        let rec = Arc::new(RecordingReporter::answering(true));
        let mut w = worker(&rec);
        assert_eq!(
            w.run(Job::Uninstall(UninstallRequest::new(&dir))).unwrap(),
            WorkerState::Done
        );
        assert!(!dir.exists());
    }

    #[test]
    fn wait_without_job_is_idle() {
        let rec = Arc::new(RecordingReporter::new());
        let mut w = worker(&rec);
        assert_eq!(w.wait(), WorkerState::Idle);
    }

    /// Records everything but blows up on the first error dialog.
    struct PanicOnCritical(RecordingReporter);

    impl Reporter for PanicOnCritical {
        fn console(&self, line: &str) {
            self.0.console(line);
        }

        fn progress(&self, percent: u8) {
            self.0.progress(percent);
        }

        fn critical(&self, _title: &str, _message: &str) {
            panic!("dialog failed");
        }

        fn info(&self, title: &str, message: &str) {
            self.0.info(title, message);
        }

        fn confirm(&self, title: &str, message: &str) -> bool {
            self.0.confirm(title, message)
        }

        fn busy(&self, busy: bool) {
            self.0.busy(busy);
        }

        fn clear_game_path(&self) {
            self.0.clear_game_path();
        }
    }

    #[test]
    fn panicking_job_still_ends_busy() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("Documents");
        fs::create_dir(&docs).unwrap();

        let rep = Arc::new(PanicOnCritical(RecordingReporter::new()));
        let mut w = Worker::new(Settings::default(), rep.clone());
        let end = w.run(Job::Uninstall(UninstallRequest::new(&docs))).unwrap();

        assert_eq!(end, WorkerState::Failed);
        assert_eq!(w.state(), WorkerState::Idle);
        assert!(rep.0.console_contains(STOPPED_LINE));
        assert_eq!(rep.0.events().last(), Some(&ReportEvent::Busy { busy: false }));
    }
}
