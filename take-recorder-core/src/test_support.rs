//! Test doubles shared by the unit tests of this crate.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{PcmBlock, PcmData, StreamSpec};
use crate::models::config::CaptureConfiguration;
use crate::models::error::RecorderError;
use crate::models::recording_result::SavedTake;
use crate::models::state::{CyclePhase, SchedulerState, SessionState};
use crate::models::status::StatusEvent;
use crate::session::recording::RecordingSession;
use crate::traits::capture_provider::{AudioBlockCallback, CaptureProvider, CaptureStream};
use crate::traits::persistence::PcmPersister;
use crate::traits::status_sink::StatusSink;

/// Capture provider driven by the test: blocks are pushed by hand.
#[derive(Default)]
pub(crate) struct ManualProvider {
    callback: Mutex<Option<AudioBlockCallback>>,
    open_error: Mutex<Option<RecorderError>>,
    start_error: Mutex<Option<RecorderError>>,
    on_start: Mutex<Vec<PcmBlock>>,
    on_stop: Mutex<Option<PcmBlock>>,
    devices: Mutex<Vec<String>>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl ManualProvider {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn as_provider(self: &Arc<Self>) -> Arc<dyn CaptureProvider> {
        Arc::clone(self) as Arc<dyn CaptureProvider>
    }

    /// Deliver a block through the most recently opened stream's callback,
    /// whatever that stream's state.
    pub(crate) fn push(&self, block: PcmBlock) {
        if let Some(callback) = self.callback() {
            callback(block);
        }
    }

    pub(crate) fn callback(&self) -> Option<AudioBlockCallback> {
        self.callback.lock().clone()
    }

    pub(crate) fn fail_open(&self, error: RecorderError) {
        *self.open_error.lock() = Some(error);
    }

    pub(crate) fn fail_start(&self, error: RecorderError) {
        *self.start_error.lock() = Some(error);
    }

    pub(crate) fn clear_failure(&self) {
        *self.open_error.lock() = None;
        *self.start_error.lock() = None;
    }

    /// Blocks delivered synchronously every time a stream starts.
    pub(crate) fn feed_on_start(&self, blocks: Vec<PcmBlock>) {
        *self.on_start.lock() = blocks;
    }

    /// A block delivered while the stream is being stopped.
    pub(crate) fn deliver_on_stop(&self, block: PcmBlock) {
        *self.on_stop.lock() = Some(block);
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn devices(&self) -> Vec<String> {
        self.devices.lock().clone()
    }
}

impl CaptureProvider for ManualProvider {
    fn open_stream(
        &self,
        device_id: &str,
        _spec: StreamSpec,
        on_block: AudioBlockCallback,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        if let Some(err) = self.open_error.lock().clone() {
            return Err(err);
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.devices.lock().push(device_id.to_string());
        *self.callback.lock() = Some(Arc::clone(&on_block));

        Ok(Box::new(ManualStream {
            start_error: self.start_error.lock().clone(),
            on_start: self.on_start.lock().clone(),
            on_stop: self.on_stop.lock().clone(),
            closes: Arc::clone(&self.closes),
            callback: on_block,
            started: false,
            closed: false,
        }))
    }
}

struct ManualStream {
    start_error: Option<RecorderError>,
    on_start: Vec<PcmBlock>,
    on_stop: Option<PcmBlock>,
    closes: Arc<AtomicUsize>,
    callback: AudioBlockCallback,
    started: bool,
    closed: bool,
}

impl CaptureStream for ManualStream {
    fn start(&mut self) -> Result<(), RecorderError> {
        if let Some(err) = self.start_error.take() {
            return Err(err);
        }
        self.started = true;
        for block in self.on_start.drain(..) {
            (self.callback)(block);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        if self.started {
            self.started = false;
            if let Some(block) = self.on_stop.take() {
                (self.callback)(block);
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Sink that records everything it receives.
#[derive(Default)]
pub(crate) struct CollectingSink {
    statuses: Mutex<Vec<StatusEvent>>,
    states: Mutex<Vec<SessionState>>,
    saved: Mutex<Vec<SavedTake>>,
    scheduler_states: Mutex<Vec<SchedulerState>>,
    countdowns: Mutex<Vec<(CyclePhase, u64)>>,
}

impl CollectingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn as_sink(self: &Arc<Self>) -> Arc<dyn StatusSink> {
        Arc::clone(self) as Arc<dyn StatusSink>
    }

    pub(crate) fn statuses(&self) -> Vec<StatusEvent> {
        self.statuses.lock().clone()
    }

    pub(crate) fn states(&self) -> Vec<SessionState> {
        self.states.lock().clone()
    }

    pub(crate) fn saved(&self) -> Vec<SavedTake> {
        self.saved.lock().clone()
    }

    pub(crate) fn scheduler_states(&self) -> Vec<SchedulerState> {
        self.scheduler_states.lock().clone()
    }

    pub(crate) fn countdowns(&self) -> Vec<(CyclePhase, u64)> {
        self.countdowns.lock().clone()
    }
}

impl StatusSink for CollectingSink {
    fn on_status(&self, status: &StatusEvent) {
        self.statuses.lock().push(status.clone());
    }

    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().push(state);
    }

    fn on_take_saved(&self, take: &SavedTake) {
        self.saved.lock().push(take.clone());
    }

    fn on_scheduler_state_changed(&self, state: SchedulerState) {
        self.scheduler_states.lock().push(state);
    }

    fn on_countdown(&self, phase: CyclePhase, remaining_secs: u64) {
        self.countdowns.lock().push((phase, remaining_secs));
    }
}

/// Persister that always fails like a full disk.
pub(crate) struct FailingPersister;

impl PcmPersister for FailingPersister {
    fn write_wav(&self, _path: &Path, _spec: &StreamSpec, _data: &PcmData) -> Result<String, RecorderError> {
        Err(RecorderError::StorageError("disk full".into()))
    }
}

/// 48 kHz mono float session writing into `dir`.
pub(crate) fn session_in(
    dir: &Path,
    provider: &Arc<ManualProvider>,
    sink: &Arc<CollectingSink>,
) -> RecordingSession {
    let config = CaptureConfiguration {
        output_directory: dir.to_path_buf(),
        ..Default::default()
    };
    let mut session = RecordingSession::new(config, provider.as_provider()).expect("valid config");
    session.set_status_sink(sink.as_sink());
    session
}
