use crate::models::recording_result::SavedTake;
use crate::models::state::{CyclePhase, SchedulerState, SessionState};
use crate::models::status::{Severity, StatusEvent};

/// Receives status notifications from the session and the scheduler.
///
/// All methods may be called from the auto-cycle thread, not only from the
/// control thread. Implementations should marshal to a UI thread if needed.
pub trait StatusSink: Send + Sync {
    /// A status line to show to the user.
    fn on_status(&self, status: &StatusEvent);

    /// Called when the recording session changes state.
    fn on_state_changed(&self, _state: SessionState) {}

    /// Called after a take has been written to disk.
    fn on_take_saved(&self, _take: &SavedTake) {}

    /// Called when auto mode starts or stops.
    fn on_scheduler_state_changed(&self, _state: SchedulerState) {}

    /// Called once per countdown tick in auto mode.
    fn on_countdown(&self, _phase: CyclePhase, _remaining_secs: u64) {}
}

/// Sink that forwards status lines to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn on_status(&self, status: &StatusEvent) {
        match status.severity {
            Severity::Error => log::error!("{}", status.message),
            Severity::Warning => log::warn!("{}", status.message),
            Severity::Info | Severity::Success => log::info!("{}", status.message),
        }
    }

    fn on_state_changed(&self, state: SessionState) {
        log::debug!("session state: {}", state);
    }
}
