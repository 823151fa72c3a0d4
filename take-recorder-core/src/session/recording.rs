use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::audio_models::{PcmBlock, PcmData};
use crate::models::config::CaptureConfiguration;
use crate::models::error::RecorderError;
use crate::models::recording_result::{SavedTake, StopOutcome, TakeMetadata};
use crate::models::state::SessionState;
use crate::models::status::StatusEvent;
use crate::models::tags::TagTuple;
use crate::naming::file_namer::FileNamer;
use crate::processing::capture_buffer::CaptureBuffer;
use crate::storage::metadata;
use crate::storage::wav_writer::WavFileWriter;
use crate::traits::capture_provider::{AudioBlockCallback, CaptureProvider, CaptureStream};
use crate::traits::filesystem::Filesystem;
use crate::traits::persistence::PcmPersister;
use crate::traits::status_sink::{LogStatusSink, StatusSink};

/// State shared with the driver callback, protected by `parking_lot::Mutex`.
///
/// The callback appends only while `state` is `Recording` and the block
/// belongs to the current `generation`, both checked under this lock.
struct SessionInner {
    state: SessionState,
    buffer: CaptureBuffer,
    discard_requested: bool,
    generation: u64,
    device_id: String,
    started_at: Option<Instant>,
    rejected_blocks: u64,
}

impl SessionInner {
    fn accept(&mut self, generation: u64, block: PcmBlock) {
        if self.state.is_recording() && self.generation == generation {
            self.buffer.append(block);
        } else {
            self.rejected_blocks += 1;
        }
    }
}

/// How a call to `toggle()` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Started,
    StartFailed(RecorderError),
    Stopped(StopOutcome),
}

/// One capture lifecycle: open stream → accumulate → close stream →
/// finalize or discard.
///
/// Shared between the control thread and the auto-cycle thread behind an
/// `Arc`. `start`, `stop` and `toggle` are serialized by an internal control
/// lock, so two callers can never double-start or lose a stop.
///
/// ```text
/// [CaptureProvider] → callback → [CaptureBuffer] → stop() → [FileNamer] → [PcmPersister]
///                                                                  ↓
///                                                            [StatusSink]
/// ```
pub struct RecordingSession {
    config: CaptureConfiguration,
    provider: Arc<dyn CaptureProvider>,
    persister: Arc<dyn PcmPersister>,
    namer: FileNamer,
    sink: Arc<dyn StatusSink>,
    inner: Arc<Mutex<SessionInner>>,
    stream: Mutex<Option<Box<dyn CaptureStream>>>,
    control: Mutex<()>,
}

impl RecordingSession {
    pub fn new(config: CaptureConfiguration, provider: Arc<dyn CaptureProvider>) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::ConfigurationFailed)?;

        let inner = SessionInner {
            state: SessionState::Idle,
            buffer: CaptureBuffer::new(config.sample_format),
            discard_requested: false,
            generation: 0,
            device_id: String::new(),
            started_at: None,
            rejected_blocks: 0,
        };

        Ok(Self {
            namer: FileNamer::new(&config.output_directory),
            config,
            provider,
            persister: Arc::new(WavFileWriter::new()),
            sink: Arc::new(LogStatusSink),
            inner: Arc::new(Mutex::new(inner)),
            stream: Mutex::new(None),
            control: Mutex::new(()),
        })
    }

    pub fn set_status_sink(&mut self, sink: Arc<dyn StatusSink>) {
        self.sink = sink;
    }

    pub fn set_persister(&mut self, persister: Arc<dyn PcmPersister>) {
        self.persister = persister;
    }

    pub fn set_filesystem(&mut self, fs: Arc<dyn Filesystem>) {
        self.namer = FileNamer::with_filesystem(&self.config.output_directory, fs);
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    pub fn status_sink(&self) -> Arc<dyn StatusSink> {
        Arc::clone(&self.sink)
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    /// Frames captured so far in the current take.
    pub fn buffered_frames(&self) -> usize {
        self.inner.lock().buffer.frame_count(self.config.channels)
    }

    /// Blocks the callback refused because no take was recording.
    pub fn rejected_blocks(&self) -> u64 {
        self.inner.lock().rejected_blocks
    }

    /// Takes already on disk for `tags`. Informational only.
    pub fn count_existing(&self, tags: &TagTuple) -> usize {
        self.namer.count_existing(tags)
    }

    /// Start capturing from `device_id`. Transitions: idle → recording.
    ///
    /// Calling this while a take is recording is a no-op that keeps the
    /// captured audio. Device failures leave the session idle, are reported
    /// through the status sink and returned.
    pub fn start(&self, device_id: &str) -> Result<(), RecorderError> {
        let _control = self.control.lock();
        self.start_locked(device_id)
    }

    /// Stop capturing and finalize the take with `tags`.
    /// Transitions: recording → finalizing → idle.
    ///
    /// `tags` is the snapshot the file is named after; later changes to the
    /// caller's inputs do not affect it.
    pub fn stop(&self, tags: &TagTuple) -> StopOutcome {
        let _control = self.control.lock();
        self.stop_locked(tags)
    }

    /// Stop if recording, otherwise start.
    pub fn toggle(&self, device_id: &str, tags: &TagTuple) -> ToggleOutcome {
        let _control = self.control.lock();
        if self.state().is_recording() {
            ToggleOutcome::Stopped(self.stop_locked(tags))
        } else {
            match self.start_locked(device_id) {
                Ok(()) => ToggleOutcome::Started,
                Err(e) => ToggleOutcome::StartFailed(e),
            }
        }
    }

    /// Drop the current take instead of saving it on the next `stop()`.
    ///
    /// Only affects a take that is recording or being stopped. `start()`
    /// clears the request, so a discard issued while idle never reaches a
    /// later take.
    pub fn discard(&self) {
        let mut s = self.inner.lock();
        s.discard_requested = true;
        log::debug!("Discard requested (state: {})", s.state);
    }

    // --- Internal helpers ---

    fn start_locked(&self, device_id: &str) -> Result<(), RecorderError> {
        let generation = {
            let s = self.inner.lock();
            if !s.state.is_idle() {
                log::warn!("Start ignored: session is {}", s.state);
                return Ok(());
            }
            s.generation + 1
        };

        let spec = self.config.stream_spec();
        let inner = Arc::clone(&self.inner);
        let callback: AudioBlockCallback = Arc::new(move |block: PcmBlock| {
            inner.lock().accept(generation, block);
        });

        let mut stream = match self.provider.open_stream(device_id, spec, callback) {
            Ok(stream) => stream,
            Err(e) => {
                self.report_start_failure(device_id, &e);
                return Err(e);
            }
        };

        // Mark recording before the driver starts so the first block is kept.
        {
            let mut s = self.inner.lock();
            s.buffer.reset(spec.sample_format);
            s.discard_requested = false;
            s.generation = generation;
            s.device_id = device_id.to_string();
            s.started_at = Some(Instant::now());
            s.state = SessionState::Recording;
        }

        if let Err(e) = stream.start() {
            {
                let mut s = self.inner.lock();
                s.state = SessionState::Idle;
                s.started_at = None;
                s.buffer.reset(spec.sample_format);
            }
            if let Err(close_err) = stream.close() {
                log::warn!("Failed to close stream after start failure: {}", close_err);
            }
            self.report_start_failure(device_id, &e);
            return Err(e);
        }

        *self.stream.lock() = Some(stream);

        log::info!(
            "Recording started on '{}' ({} Hz, {} ch, {})",
            device_id,
            spec.sample_rate,
            spec.channels,
            spec.sample_format
        );
        self.sink.on_state_changed(SessionState::Recording);
        self.sink
            .on_status(&StatusEvent::info(format!("Recording started ({})", device_id)));
        Ok(())
    }

    fn stop_locked(&self, tags: &TagTuple) -> StopOutcome {
        {
            let mut s = self.inner.lock();
            if !s.state.is_recording() {
                return StopOutcome::NotRecording;
            }
            // From here on the callback rejects every block.
            s.state = SessionState::Finalizing;
        }
        self.sink.on_state_changed(SessionState::Finalizing);

        self.close_stream();

        let (data, discarded, device_id, elapsed) = {
            let mut s = self.inner.lock();
            let discarded = std::mem::take(&mut s.discard_requested);
            let elapsed = s.started_at.take().map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0);
            let data = if s.buffer.is_empty() || discarded {
                s.buffer.reset(self.config.sample_format);
                None
            } else {
                Some(s.buffer.drain())
            };
            (data, discarded, s.device_id.clone(), elapsed)
        };

        let outcome = match data {
            None if !discarded => {
                log::info!("Take stopped after {:.1}s with no data", elapsed);
                self.sink.on_status(&StatusEvent::info("No data captured"));
                StopOutcome::NoData
            }
            None => {
                log::info!("Take discarded after {:.1}s", elapsed);
                self.sink.on_status(&StatusEvent::info("Recording discarded"));
                StopOutcome::Discarded
            }
            Some(data) => match self.persist(tags, &device_id, data) {
                Ok(take) => {
                    self.sink
                        .on_status(&StatusEvent::success(format!("Saved at {}", take.file_path.display())));
                    self.sink.on_take_saved(&take);
                    StopOutcome::Saved(take)
                }
                Err(e) => {
                    log::error!("Failed to save take: {}", e);
                    self.sink
                        .on_status(&StatusEvent::error(format!("Failed to save take: {}", e)));
                    StopOutcome::Failed(e)
                }
            },
        };

        self.inner.lock().state = SessionState::Idle;
        self.sink.on_state_changed(SessionState::Idle);
        outcome
    }

    fn close_stream(&self) {
        if let Some(mut stream) = self.stream.lock().take() {
            if let Err(e) = stream.stop() {
                log::warn!("Failed to stop capture stream: {}", e);
            }
            if let Err(e) = stream.close() {
                log::warn!("Failed to close capture stream: {}", e);
            }
        }
    }

    fn persist(&self, tags: &TagTuple, device_id: &str, data: PcmData) -> Result<SavedTake, RecorderError> {
        let spec = self.config.stream_spec();
        let path = self.namer.next_path(tags)?;
        let checksum = self.persister.write_wav(&path, &spec, &data)?;

        let frames = (data.len() / spec.channels as usize) as u64;
        let duration_secs = frames as f64 / spec.sample_rate as f64;
        let metadata = TakeMetadata::new(
            tags,
            device_id,
            &spec,
            duration_secs,
            &path.to_string_lossy(),
            &checksum,
        );

        if self.config.write_metadata {
            if let Err(e) = metadata::write_metadata(&metadata, &path) {
                log::warn!("Take saved without metadata: {}", e);
                self.sink
                    .on_status(&StatusEvent::warning(format!("Metadata not written: {}", e)));
            }
        }

        log::info!("Saved {} frames ({:.2}s) to {}", frames, duration_secs, path.display());

        Ok(SavedTake {
            file_path: path,
            tags: tags.clone(),
            frames,
            duration_secs,
            checksum,
            metadata,
        })
    }

    fn report_start_failure(&self, device_id: &str, error: &RecorderError) {
        log::error!("Cannot start recording on '{}': {}", device_id, error);
        self.sink
            .on_status(&StatusEvent::error(format!("Cannot start recording: {}", error)));
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.close_stream();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::SampleFormat;
    use crate::models::status::Severity;
    use crate::test_support::{session_in, CollectingSink, FailingPersister, ManualProvider};

    fn tags() -> TagTuple {
        TagTuple::new(["A", "open", "1", "1"])
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        assert_eq!(session.stop(&tags()), StopOutcome::NotRecording);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(sink.statuses().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[test]
    fn start_then_stop_saves_take() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        assert!(session.is_recording());
        provider.push(PcmBlock::F32(vec![0.1, 0.2]));
        provider.push(PcmBlock::F32(vec![0.3]));
        assert_eq!(session.buffered_frames(), 3);

        let outcome = session.stop(&tags());
        let take = outcome.saved().expect("take saved");
        assert_eq!(take.file_path, dir.path().join("A_open_1_1_1.wav"));
        assert_eq!(take.frames, 3);
        assert!(take.file_path.exists());
        assert_eq!(session.state(), SessionState::Idle);

        let last = sink.statuses().pop().unwrap();
        assert_eq!(last.severity, Severity::Success);
        assert!(last.message.starts_with("Saved at"));
        assert_eq!(sink.saved().len(), 1);
        assert_eq!(
            sink.states(),
            vec![SessionState::Recording, SessionState::Finalizing, SessionState::Idle]
        );
    }

    #[test]
    fn stop_without_blocks_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        assert_eq!(session.stop(&tags()), StopOutcome::NoData);

        let last = sink.statuses().pop().unwrap();
        assert_eq!(last, StatusEvent::info("No data captured"));
        assert_eq!(session.count_existing(&tags()), 0);
    }

    #[test]
    fn discard_drops_take_regardless_of_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.5; 64]));
        session.discard();

        assert_eq!(session.stop(&tags()), StopOutcome::Discarded);
        assert_eq!(sink.statuses().pop().unwrap(), StatusEvent::info("Recording discarded"));
        assert_eq!(session.count_existing(&tags()), 0);
    }

    #[test]
    fn discard_is_consumed_by_one_stop() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.5]));
        session.discard();
        assert_eq!(session.stop(&tags()), StopOutcome::Discarded);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.5]));
        assert!(session.stop(&tags()).saved().is_some());
    }

    #[test]
    fn discard_while_idle_does_not_reach_next_take() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.discard();
        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.25]));

        assert!(session.stop(&tags()).saved().is_some());
    }

    #[test]
    fn start_while_recording_keeps_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.1, 0.2, 0.3]));

        session.start("other").unwrap();
        assert_eq!(provider.open_count(), 1);
        assert_eq!(session.buffered_frames(), 3);

        let take = session.stop(&tags());
        assert_eq!(take.saved().unwrap().frames, 3);
    }

    #[test]
    fn open_failure_stays_idle_with_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        provider.fail_open(RecorderError::DeviceNotAvailable("Focusrite 2i2".into()));
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        let err = session.start("Focusrite 2i2").unwrap_err();
        assert!(err.is_device_error());
        assert_eq!(session.state(), SessionState::Idle);

        let status = sink.statuses().pop().unwrap();
        assert!(status.is_error());
        assert!(status.message.contains("Focusrite 2i2"));

        // Retrying with another device works.
        provider.clear_failure();
        session.start("Built-in").unwrap();
        assert!(session.is_recording());
    }

    #[test]
    fn stream_start_failure_closes_stream() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        provider.fail_start(RecorderError::StreamFailed("format unsupported".into()));
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        assert!(session.start("mic").is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(provider.close_count(), 1);
        assert_eq!(session.stop(&tags()), StopOutcome::NotRecording);
    }

    #[test]
    fn late_blocks_after_stop_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        provider.deliver_on_stop(PcmBlock::F32(vec![9.0; 4]));
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.1, 0.2]));
        let take = session.stop(&tags());
        assert_eq!(take.saved().unwrap().frames, 2);

        // A block that raced the stop and one that arrives after it.
        provider.push(PcmBlock::F32(vec![9.0]));
        assert_eq!(session.rejected_blocks(), 2);
        assert_eq!(session.buffered_frames(), 0);
    }

    #[test]
    fn stale_stream_cannot_feed_new_take() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        let first_callback = provider.callback().unwrap();
        session.stop(&tags());

        session.start("mic").unwrap();
        first_callback(PcmBlock::F32(vec![1.0]));
        assert_eq!(session.buffered_frames(), 0);
        assert_eq!(session.stop(&tags()), StopOutcome::NoData);
    }

    #[test]
    fn stream_is_stopped_and_closed_once() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        session.stop(&tags());
        session.stop(&tags());

        assert_eq!(provider.close_count(), 1);
    }

    #[test]
    fn persistence_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let mut session = session_in(dir.path(), &provider, &sink);
        session.set_persister(Arc::new(FailingPersister));

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.1]));

        match session.stop(&tags()) {
            StopOutcome::Failed(RecorderError::StorageError(msg)) => assert!(msg.contains("disk full")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(sink.statuses().pop().unwrap().is_error());
        assert_eq!(session.state(), SessionState::Idle);

        // Nothing is retried on the next stop.
        assert_eq!(session.stop(&tags()), StopOutcome::NotRecording);
    }

    #[test]
    fn toggle_flips_between_idle_and_recording() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        assert_eq!(session.toggle("mic", &tags()), ToggleOutcome::Started);
        provider.push(PcmBlock::F32(vec![0.1]));
        match session.toggle("mic", &tags()) {
            ToggleOutcome::Stopped(StopOutcome::Saved(take)) => {
                assert_eq!(take.file_path, dir.path().join("A_open_1_1_1.wav"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(session.toggle("mic", &tags()), ToggleOutcome::Started);
        provider.push(PcmBlock::F32(vec![0.1]));
        assert!(matches!(session.toggle("mic", &tags()), ToggleOutcome::Stopped(StopOutcome::Saved(_))));
        assert_eq!(session.count_existing(&tags()), 2);
    }

    #[test]
    fn tags_are_bound_at_stop() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.1]));
        let take = session.stop(&TagTuple::new(["C", "barre_e"]));

        assert_eq!(take.saved().unwrap().file_path, dir.path().join("C_barre_e_1.wav"));
    }

    #[test]
    fn writes_metadata_sidecar_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let config = CaptureConfiguration {
            output_directory: dir.path().to_path_buf(),
            sample_format: SampleFormat::I32,
            channels: 2,
            write_metadata: true,
            ..Default::default()
        };
        let mut session = RecordingSession::new(config, provider.as_provider()).unwrap();
        session.set_status_sink(sink.as_sink());

        session.start("mic").unwrap();
        provider.push(PcmBlock::I32(vec![1, 2, 3, 4]));
        let outcome = session.stop(&tags());
        let take = outcome.saved().unwrap();
        assert_eq!(take.frames, 2);

        let loaded = metadata::read_metadata(&take.file_path).unwrap();
        assert_eq!(loaded.tags, tags());
        assert_eq!(loaded.device_id, "mic");
        assert_eq!(loaded.channels, 2);
        assert_eq!(loaded.checksum, take.checksum);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let provider = ManualProvider::new();
        let config = CaptureConfiguration {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            RecordingSession::new(config, provider.as_provider()),
            Err(RecorderError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn end_to_end_take_contains_concatenated_samples() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);
        let tags = TagTuple::new(["X", "Y", "Z", "1", "ID1"]);

        session.start("mic").unwrap();
        provider.push(PcmBlock::F32(vec![0.0, 0.1, 0.2]));
        provider.push(PcmBlock::F32(vec![0.3, 0.4]));
        provider.push(PcmBlock::F32(vec![-0.5, -1.0, 1.0]));
        session.stop(&tags);

        let path = dir.path().join("X_Y_Z_1_ID1_1.wav");
        assert!(path.exists());

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 48000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.0, 0.1, 0.2, 0.3, 0.4, -0.5, -1.0, 1.0]);
    }

    #[test]
    fn concurrent_toggles_never_double_start_or_lose_a_stop() {
        const THREADS: usize = 8;
        const TOGGLES: usize = 40;

        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        provider.feed_on_start(vec![PcmBlock::F32(vec![0.25; 8])]);
        let sink = CollectingSink::new();
        let session = Arc::new(session_in(dir.path(), &provider, &sink));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let session = Arc::clone(&session);
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || {
                    for _ in 0..TOGGLES {
                        session.toggle("mic", &tags());
                        provider.push(PcmBlock::F32(vec![0.5; 4]));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // An even number of serialized flips lands back on Idle.
        assert_eq!(session.state(), SessionState::Idle);
        let takes = THREADS * TOGGLES / 2;
        assert_eq!(provider.open_count(), takes);
        assert_eq!(provider.close_count(), takes);
        assert_eq!(sink.saved().len(), takes);
        let files = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().map_or(false, |x| x == "wav"))
            .count();
        assert_eq!(files, takes);
    }

    #[test]
    fn callback_from_another_thread_never_feeds_a_stopped_take() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManualProvider::new();
        let sink = CollectingSink::new();
        let session = session_in(dir.path(), &provider, &sink);
        let running = Arc::new(std::sync::atomic::AtomicBool::new(true));

        let driver = {
            let provider = Arc::clone(&provider);
            let running = Arc::clone(&running);
            std::thread::spawn(move || {
                while running.load(std::sync::atomic::Ordering::SeqCst) {
                    provider.push(PcmBlock::F32(vec![0.1; 32]));
                }
            })
        };

        for _ in 0..50 {
            session.start("mic").unwrap();
            std::thread::yield_now();
            session.stop(&tags());
            assert_eq!(session.state(), SessionState::Idle);
            assert_eq!(session.buffered_frames(), 0);
        }

        running.store(false, std::sync::atomic::Ordering::SeqCst);
        driver.join().unwrap();
        assert_eq!(session.buffered_frames(), 0);
        for take in sink.saved() {
            assert_eq!(take.frames % 32, 0);
        }
    }
}
