//! cpal capture provider.
//!
//! cpal streams are not `Send` on every host, so each opened stream lives on
//! a dedicated `cpal-capture` thread. `CpalCaptureStream` drives that thread
//! over a command channel and waits for each reply.

use std::sync::{mpsc, Arc};
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use take_recorder_core::models::audio_models::{PcmBlock, SampleFormat, StreamSpec};
use take_recorder_core::models::error::RecorderError;
use take_recorder_core::models::status::StatusEvent;
use take_recorder_core::traits::capture_provider::{AudioBlockCallback, CaptureProvider, CaptureStream};
use take_recorder_core::traits::status_sink::StatusSink;

use crate::device_enumerator::DeviceEnumerator;

type Reply = mpsc::Sender<Result<(), RecorderError>>;

enum StreamCommand {
    Play(Reply),
    Pause(Reply),
    Close,
}

/// Opens input streams on the default cpal host.
#[derive(Default, Clone)]
pub struct CpalProvider {
    events: Option<Arc<dyn StatusSink>>,
}

impl CpalProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report driver errors during a take (e.g. an unplugged device) to `sink`.
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.events = Some(sink);
        self
    }
}

impl CaptureProvider for CpalProvider {
    fn open_stream(
        &self,
        device_id: &str,
        spec: StreamSpec,
        on_block: AudioBlockCallback,
    ) -> Result<Box<dyn CaptureStream>, RecorderError> {
        let (opened_tx, opened_rx) = mpsc::sync_channel(1);
        let (command_tx, command_rx) = mpsc::channel();
        let device_id = device_id.to_string();
        let events = self.events.clone();

        let handle = thread::Builder::new()
            .name("cpal-capture".into())
            .spawn(move || capture_thread(&device_id, spec, on_block, events, opened_tx, command_rx))
            .map_err(|e| RecorderError::StreamFailed(format!("failed to spawn capture thread: {}", e)))?;

        match opened_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(CpalCaptureStream {
                commands: command_tx,
                handle: Some(handle),
                playing: false,
            })),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(RecorderError::StreamFailed("capture thread exited before opening".into()))
            }
        }
    }
}

/// Handle to a stream owned by a `cpal-capture` thread.
pub struct CpalCaptureStream {
    commands: mpsc::Sender<StreamCommand>,
    handle: Option<thread::JoinHandle<()>>,
    playing: bool,
}

impl CpalCaptureStream {
    fn request(&self, command: fn(Reply) -> StreamCommand) -> Result<(), RecorderError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| RecorderError::StreamFailed("capture thread has exited".into()))?;
        reply_rx
            .recv()
            .map_err(|_| RecorderError::StreamFailed("capture thread has exited".into()))?
    }
}

impl CaptureStream for CpalCaptureStream {
    fn start(&mut self) -> Result<(), RecorderError> {
        if self.handle.is_none() {
            return Err(RecorderError::StreamFailed("stream is closed".into()));
        }
        self.request(StreamCommand::Play)?;
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        if !self.playing {
            return Ok(());
        }
        self.playing = false;
        self.request(StreamCommand::Pause)
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.playing = false;
        let _ = self.commands.send(StreamCommand::Close);
        handle
            .join()
            .map_err(|_| RecorderError::StreamFailed("capture thread panicked".into()))
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close capture stream: {}", e);
        }
    }
}

/// Owns the cpal stream for its whole life. Reports the open result once,
/// then serves commands until `Close` or until the handle is dropped.
fn capture_thread(
    device_id: &str,
    spec: StreamSpec,
    on_block: AudioBlockCallback,
    events: Option<Arc<dyn StatusSink>>,
    opened: mpsc::SyncSender<Result<(), RecorderError>>,
    commands: mpsc::Receiver<StreamCommand>,
) {
    let stream = match build_stream(device_id, spec, on_block, events) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = opened.send(Err(e));
            return;
        }
    };
    // Some hosts start streams on build.
    if let Err(e) = stream.pause() {
        log::debug!("Initial pause not supported: {}", e);
    }
    let _ = opened.send(Ok(()));

    while let Ok(command) = commands.recv() {
        match command {
            StreamCommand::Play(reply) => {
                let result = stream
                    .play()
                    .map_err(|e| RecorderError::StreamFailed(format!("failed to start stream: {}", e)));
                let _ = reply.send(result);
            }
            StreamCommand::Pause(reply) => {
                let result = stream
                    .pause()
                    .map_err(|e| RecorderError::StreamFailed(format!("failed to pause stream: {}", e)));
                let _ = reply.send(result);
            }
            StreamCommand::Close => break,
        }
    }

    drop(stream);
    log::debug!("Capture thread for {:?} exited", device_id);
}

fn build_stream(
    device_id: &str,
    spec: StreamSpec,
    on_block: AudioBlockCallback,
    events: Option<Arc<dyn StatusSink>>,
) -> Result<cpal::Stream, RecorderError> {
    let device = DeviceEnumerator::new().find_input_device(device_id)?;
    let native = choose_native_format(&device, &spec)?;

    log::info!(
        "Using audio input device {:?}: {} Hz, {} channels, native {:?} → {}",
        device.name().unwrap_or_default(),
        spec.sample_rate,
        spec.channels,
        native,
        spec.sample_format
    );

    let config = cpal::StreamConfig {
        channels: spec.channels,
        sample_rate: cpal::SampleRate(spec.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    match native {
        cpal::SampleFormat::F32 => build_typed::<f32>(&device, &config, spec.sample_format, on_block, events),
        cpal::SampleFormat::I32 => build_typed::<i32>(&device, &config, spec.sample_format, on_block, events),
        cpal::SampleFormat::I16 => build_typed::<i16>(&device, &config, spec.sample_format, on_block, events),
        cpal::SampleFormat::U16 => build_typed::<u16>(&device, &config, spec.sample_format, on_block, events),
        other => Err(RecorderError::UnsupportedFormat(format!(
            "device sample format {:?} is not supported",
            other
        ))),
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    target: SampleFormat,
    on_block: AudioBlockCallback,
    events: Option<Arc<dyn StatusSink>>,
) -> Result<cpal::Stream, RecorderError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
    i32: FromSample<T>,
{
    let err_fn = move |err: cpal::StreamError| report_stream_error(events.as_deref(), &err);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| on_block(convert_block(data, target)),
            err_fn,
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                RecorderError::DeviceNotAvailable("device disappeared while opening".into())
            }
            cpal::BuildStreamError::StreamConfigNotSupported => {
                RecorderError::UnsupportedFormat("stream configuration not supported".into())
            }
            other => RecorderError::StreamFailed(other.to_string()),
        })
}

fn report_stream_error(events: Option<&dyn StatusSink>, err: &cpal::StreamError) {
    log::error!("Audio stream error: {}", err);
    if let Some(sink) = events {
        sink.on_status(&StatusEvent::error(format!("Audio stream error: {}", err)));
    }
}

/// Native formats to try, best first.
fn preferred_formats(target: SampleFormat) -> [cpal::SampleFormat; 4] {
    match target {
        SampleFormat::F32 => [
            cpal::SampleFormat::F32,
            cpal::SampleFormat::I32,
            cpal::SampleFormat::I16,
            cpal::SampleFormat::U16,
        ],
        SampleFormat::I32 => [
            cpal::SampleFormat::I32,
            cpal::SampleFormat::F32,
            cpal::SampleFormat::I16,
            cpal::SampleFormat::U16,
        ],
    }
}

fn choose_native_format(device: &cpal::Device, spec: &StreamSpec) -> Result<cpal::SampleFormat, RecorderError> {
    let ranges: Vec<cpal::SupportedStreamConfigRange> = device
        .supported_input_configs()
        .map_err(|e| RecorderError::DeviceNotAvailable(format!("failed to query device formats: {}", e)))?
        .collect();

    preferred_formats(spec.sample_format)
        .into_iter()
        .find(|format| {
            ranges.iter().any(|range| {
                range.sample_format() == *format
                    && range.channels() == spec.channels
                    && range.min_sample_rate().0 <= spec.sample_rate
                    && spec.sample_rate <= range.max_sample_rate().0
            })
        })
        .ok_or_else(|| {
            RecorderError::UnsupportedFormat(format!(
                "device does not support {} channel(s) at {} Hz",
                spec.channels, spec.sample_rate
            ))
        })
}

/// Convert one driver buffer into the session's sample format.
fn convert_block<T>(data: &[T], target: SampleFormat) -> PcmBlock
where
    T: Sample,
    f32: FromSample<T>,
    i32: FromSample<T>,
{
    match target {
        SampleFormat::F32 => PcmBlock::F32(data.iter().map(|&s| f32::from_sample(s)).collect()),
        SampleFormat::I32 => PcmBlock::I32(data.iter().map(|&s| i32::from_sample(s)).collect()),
    }
}
