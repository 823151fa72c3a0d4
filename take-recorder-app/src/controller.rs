use std::sync::Arc;

use take_recorder_core::models::error::RecorderError;
use take_recorder_core::models::status::StatusEvent;
use take_recorder_core::scheduler::auto_cycle::AutoCycleScheduler;
use take_recorder_core::session::recording::RecordingSession;
use take_recorder_core::traits::control_inputs::{ControlInputs, SharedInputs};
use take_recorder_core::traits::status_sink::StatusSink;

use crate::commands::ConsoleCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies console commands to the session, the scheduler and the shared inputs.
pub struct Controller {
    session: Arc<RecordingSession>,
    scheduler: AutoCycleScheduler,
    inputs: Arc<SharedInputs>,
    sink: Arc<dyn StatusSink>,
}

impl Controller {
    pub fn new(session: Arc<RecordingSession>, scheduler: AutoCycleScheduler, inputs: Arc<SharedInputs>) -> Self {
        let sink = session.status_sink();
        Self {
            session,
            scheduler,
            inputs,
            sink,
        }
    }

    pub fn session(&self) -> &Arc<RecordingSession> {
        &self.session
    }

    pub fn scheduler(&self) -> &AutoCycleScheduler {
        &self.scheduler
    }

    /// `execute`, with failures reported as status lines instead of returned.
    pub fn handle(&self, command: ConsoleCommand) -> Flow {
        self.report(self.execute(command))
    }

    pub fn execute(&self, command: ConsoleCommand) -> Result<Flow, RecorderError> {
        match command {
            ConsoleCommand::Toggle => {
                if self.scheduler.is_running() {
                    self.notify(StatusEvent::warning("Auto mode is running; press a to stop it"));
                } else {
                    self.session.toggle(&self.inputs.device_id(), &self.inputs.tags());
                }
            }
            ConsoleCommand::Discard => self.session.discard(),
            ConsoleCommand::ToggleAuto => {
                if self.scheduler.is_running() {
                    self.scheduler.disable();
                } else {
                    self.scheduler.enable()?;
                }
            }
            ConsoleCommand::SetTags(tags) => {
                let existing = self.session.count_existing(&tags);
                self.notify(StatusEvent::info(format!("Tags: {} ({} existing)", tags, existing)));
                self.inputs.set_tags(tags);
            }
            ConsoleCommand::SetWait(text) => {
                self.notify(StatusEvent::info(format!("Wait: {}s", text)));
                self.inputs.set_wait_seconds(text);
            }
            ConsoleCommand::SetRecord(text) => {
                self.notify(StatusEvent::info(format!("Record: {}s", text)));
                self.inputs.set_record_seconds(text);
            }
            ConsoleCommand::Count => {
                let tags = self.inputs.tags();
                let existing = self.session.count_existing(&tags);
                self.notify(StatusEvent::info(format!("{} takes for {}", existing, tags.base_name())));
            }
            ConsoleCommand::Status => {
                self.notify(StatusEvent::info(format!(
                    "Session {}, auto mode {}, {} frames buffered, tags {}",
                    self.session.state(),
                    if self.scheduler.is_running() { "on" } else { "off" },
                    self.session.buffered_frames(),
                    self.inputs.tags()
                )));
            }
            ConsoleCommand::Quit => {
                self.shutdown();
                return Ok(Flow::Quit);
            }
            // Handled by the console loop.
            ConsoleCommand::ListDevices | ConsoleCommand::Help => {}
        }
        Ok(Flow::Continue)
    }

    /// Stop auto mode, then save any manual take in progress.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        if self.session.is_recording() {
            self.session.stop(&self.inputs.tags());
        }
    }

    fn report(&self, result: Result<Flow, RecorderError>) -> Flow {
        result.unwrap_or_else(|e| {
            log::error!("Command failed: {}", e);
            self.notify(StatusEvent::error(format!("Command failed: {}", e)));
            Flow::Continue
        })
    }

    fn notify(&self, status: StatusEvent) {
        self.sink.on_status(&status);
    }
}
