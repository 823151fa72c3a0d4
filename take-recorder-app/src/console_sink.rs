use std::io::Write;

use parking_lot::Mutex;

use take_recorder_core::models::recording_result::SavedTake;
use take_recorder_core::models::state::{SchedulerState, SessionState};
use take_recorder_core::models::status::{Severity, StatusEvent};
use take_recorder_core::traits::status_sink::StatusSink;

/// StatusSink that prints status lines to a console writer and mirrors
/// them to the log.
pub struct ConsoleStatusSink<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleStatusSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleStatusSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn print(&self, line: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

impl<W: Write + Send> StatusSink for ConsoleStatusSink<W> {
    fn on_status(&self, status: &StatusEvent) {
        match status.severity {
            Severity::Error => log::error!("{}", status.message),
            Severity::Warning => log::warn!("{}", status.message),
            Severity::Info | Severity::Success => log::debug!("{}", status.message),
        }
        self.print(&status.to_string());
    }

    fn on_state_changed(&self, state: SessionState) {
        log::debug!("session state: {}", state);
    }

    fn on_take_saved(&self, take: &SavedTake) {
        self.print(&format!(
            "  {} frames, {:.2}s, sha256 {}",
            take.frames, take.duration_secs, take.checksum
        ));
    }

    fn on_scheduler_state_changed(&self, state: SchedulerState) {
        log::debug!("auto mode: {:?}", state);
    }
}
