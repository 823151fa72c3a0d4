//! # take-recorder-core
//!
//! Platform-agnostic core of the take recorder.
//!
//! Captures PCM from an input device into memory, names each take after a
//! tag tuple, and writes it as a WAV file. An optional auto-cycle scheduler
//! repeats wait → record → save cycles. Audio backends implement the
//! `CaptureProvider` trait and plug into `RecordingSession`.
//!
//! ## Architecture
//!
//! ```text
//! take-recorder-core (this crate)
//! ├── traits/       ← CaptureProvider, StatusSink, PcmPersister, Filesystem, ControlInputs
//! ├── models/       ← RecorderError, SessionState, CaptureConfiguration, TagTuple, etc.
//! ├── processing/   ← CaptureBuffer, WAV header generation
//! ├── naming/       ← FileNamer
//! ├── session/      ← RecordingSession (start/stop/toggle/discard)
//! ├── scheduler/    ← AutoCycleScheduler
//! └── storage/      ← WavFileWriter, metadata sidecar
//! ```

pub mod models;
pub mod naming;
pub mod processing;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioSource, PcmBlock, PcmData, SampleFormat, StreamSpec};
pub use models::config::CaptureConfiguration;
pub use models::error::RecorderError;
pub use models::recording_result::{SavedTake, StopOutcome, TakeMetadata};
pub use models::state::{CyclePhase, SchedulerState, SessionState};
pub use models::status::{Severity, StatusEvent};
pub use models::tags::TagTuple;
pub use naming::file_namer::FileNamer;
pub use processing::capture_buffer::CaptureBuffer;
pub use scheduler::auto_cycle::AutoCycleScheduler;
pub use session::recording::{RecordingSession, ToggleOutcome};
pub use storage::wav_writer::WavFileWriter;
pub use traits::capture_provider::{AudioBlockCallback, CaptureProvider, CaptureStream};
pub use traits::control_inputs::{ControlInputs, SharedInputs};
pub use traits::filesystem::{Filesystem, LocalFilesystem};
pub use traits::persistence::PcmPersister;
pub use traits::status_sink::{LogStatusSink, StatusSink};
