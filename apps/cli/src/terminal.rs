//! Renders reporter traffic on the terminal.

use std::io::{self, BufRead, Write};

use ddmi_report::{ReportEvent, UiMessage};

/// Main-thread sink for [`UiMessage`]s.
///
/// Progress is only ever shown going up; a late lower value is dropped.
pub struct Terminal<W, R> {
    out: W,
    input: R,
    json: bool,
    assume_yes: bool,
    shown_progress: Option<u8>,
}

impl<W: Write, R: BufRead> Terminal<W, R> {
    pub fn new(out: W, input: R, json: bool, assume_yes: bool) -> Self {
        Self {
            out,
            input,
            json,
            assume_yes,
            shown_progress: None,
        }
    }

    pub fn handle(&mut self, message: UiMessage) -> io::Result<()> {
        match message {
            UiMessage::Event(event) => self.event(event),
            UiMessage::Prompt {
                title,
                message,
                reply,
            } => {
                let answer = self.prompt(title, message)?;
                if reply.send(answer).is_err() {
                    tracing::debug!("worker stopped waiting for the prompt");
                }
                Ok(())
            }
        }
    }

    fn event(&mut self, event: ReportEvent) -> io::Result<()> {
        match event {
            ReportEvent::Progress { percent } => {
                if self.shown_progress.is_some_and(|shown| percent <= shown) {
                    return Ok(());
                }
                self.shown_progress = Some(percent);
            }
            ReportEvent::Busy { busy: true } => self.shown_progress = None,
            _ => {}
        }

        if self.json {
            return self.json_line(&event);
        }

        match event {
            ReportEvent::Console { line } => writeln!(self.out, "{line}"),
            ReportEvent::Progress { percent } => writeln!(self.out, "[{percent:>3}%]"),
            ReportEvent::Critical { title, message } => {
                tracing::error!(title = %title, "{message}");
                writeln!(self.out, "{title}: {message}")
            }
            ReportEvent::Info { title, message } => writeln!(self.out, "{title}: {message}"),
            ReportEvent::Busy { .. } | ReportEvent::Confirm { .. } | ReportEvent::GamePathCleared => {
                Ok(())
            }
        }
    }

    fn prompt(&mut self, title: String, message: String) -> io::Result<bool> {
        if self.json {
            self.json_line(&ReportEvent::Confirm {
                title: title.clone(),
                message: message.clone(),
            })?;
        } else {
            write!(self.out, "{title}: {message} [y/N] ")?;
        }

        if self.assume_yes {
            if !self.json {
                writeln!(self.out, "y")?;
            }
            return Ok(true);
        }
        self.out.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn json_line(&mut self, event: &ReportEvent) -> io::Result<()> {
        let line = serde_json::to_string(event).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use ddmi_report::{Reporter, channel};

    use super::*;

    fn render(json: bool, events: Vec<ReportEvent>) -> String {
        let mut term = Terminal::new(Vec::new(), io::empty(), json, false);
        for event in events {
            term.handle(UiMessage::Event(event)).unwrap();
        }
        String::from_utf8(term.into_output()).unwrap()
    }

    #[test]
    fn progress_never_goes_down() {
        let out = render(
            false,
            vec![
                ReportEvent::Progress { percent: 10 },
                ReportEvent::Progress { percent: 50 },
                ReportEvent::Progress { percent: 30 },
                ReportEvent::Progress { percent: 50 },
                ReportEvent::Progress { percent: 100 },
            ],
        );
        assert_eq!(out, "[ 10%]\n[ 50%]\n[100%]\n");
    }

    #[test]
    fn busy_resets_progress_for_next_job() {
        let out = render(
            false,
            vec![
                ReportEvent::Progress { percent: 100 },
                ReportEvent::Busy { busy: true },
                ReportEvent::Progress { percent: 20 },
            ],
        );
        assert_eq!(out, "[100%]\n[ 20%]\n");
    }

    #[test]
    fn json_mode_prints_one_object_per_line() {
        let out = render(
            true,
            vec![
                ReportEvent::Console { line: "hello".into() },
                ReportEvent::GamePathCleared,
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"type":"console","line":"hello"}"#,
                r#"{"type":"gamePathCleared"}"#,
            ]
        );
    }

    #[test]
    fn prompt_reads_answer_from_input() {
        let (reporter, mut rx) = channel();
        let asker = std::thread::spawn(move || reporter.confirm("Confirm Uninstall", "Sure?"));

        let mut term = Terminal::new(Vec::new(), &b"yes\n"[..], false, false);
        let msg = rx.blocking_recv().unwrap();
        term.handle(msg).unwrap();

        assert!(asker.join().unwrap());
        let out = String::from_utf8(term.into_output()).unwrap();
        assert_eq!(out, "Confirm Uninstall: Sure? [y/N] ");
    }

    #[test]
    fn anything_but_yes_declines() {
        let (reporter, mut rx) = channel();
        let asker = std::thread::spawn(move || reporter.confirm("Confirm Uninstall", "Sure?"));

        let mut term = Terminal::new(Vec::new(), &b"\n"[..], false, false);
        term.handle(rx.blocking_recv().unwrap()).unwrap();
        assert!(!asker.join().unwrap());
    }

    #[test]
    fn assume_yes_skips_input() {
        let (reporter, mut rx) = channel();
        let asker = std::thread::spawn(move || reporter.confirm("Confirm Uninstall", "Sure?"));

        let mut term = Terminal::new(Vec::new(), io::empty(), false, true);
        term.handle(rx.blocking_recv().unwrap()).unwrap();
        assert!(asker.join().unwrap());
    }
}
