use parking_lot::RwLock;

use crate::models::tags::TagTuple;

/// Current values of the user-facing inputs.
///
/// The auto-cycle loop reads these at the start of every cycle, so edits
/// made while auto mode runs apply to the next take.
pub trait ControlInputs: Send + Sync {
    fn device_id(&self) -> String;

    fn tags(&self) -> TagTuple;

    /// Raw wait-seconds text, parsed by the scheduler.
    fn wait_seconds(&self) -> String;

    /// Raw record-seconds text, parsed by the scheduler.
    fn record_seconds(&self) -> String;
}

/// In-memory `ControlInputs` the front end writes into.
#[derive(Debug, Default)]
pub struct SharedInputs {
    device_id: RwLock<String>,
    tags: RwLock<TagTuple>,
    wait_seconds: RwLock<String>,
    record_seconds: RwLock<String>,
}

impl SharedInputs {
    pub fn new(device_id: impl Into<String>, tags: TagTuple) -> Self {
        Self {
            device_id: RwLock::new(device_id.into()),
            tags: RwLock::new(tags),
            wait_seconds: RwLock::new("3".into()),
            record_seconds: RwLock::new("5".into()),
        }
    }

    pub fn set_device_id(&self, device_id: impl Into<String>) {
        *self.device_id.write() = device_id.into();
    }

    pub fn set_tags(&self, tags: TagTuple) {
        *self.tags.write() = tags;
    }

    pub fn set_wait_seconds(&self, text: impl Into<String>) {
        *self.wait_seconds.write() = text.into();
    }

    pub fn set_record_seconds(&self, text: impl Into<String>) {
        *self.record_seconds.write() = text.into();
    }
}

impl ControlInputs for SharedInputs {
    fn device_id(&self) -> String {
        self.device_id.read().clone()
    }

    fn tags(&self) -> TagTuple {
        self.tags.read().clone()
    }

    fn wait_seconds(&self) -> String {
        self.wait_seconds.read().clone()
    }

    fn record_seconds(&self) -> String {
        self.record_seconds.read().clone()
    }
}
