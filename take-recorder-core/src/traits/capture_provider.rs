use std::sync::Arc;

use crate::models::audio_models::{PcmBlock, StreamSpec};
use crate::models::error::RecorderError;

/// Callback invoked by the driver each time a block of samples is captured.
///
/// Runs on the driver's audio thread. Implementations must not block.
pub type AudioBlockCallback = Arc<dyn Fn(PcmBlock) + Send + Sync + 'static>;

/// Opens capture streams on a device chosen by identifier.
///
/// Implemented by:
/// - `CpalProvider` (take-recorder-app)
/// - the manual provider used by this crate's tests
pub trait CaptureProvider: Send + Sync {
    /// Open a stream for `device_id` in the given format.
    ///
    /// The stream is created stopped; `on_block` must not fire before
    /// `CaptureStream::start`.
    fn open_stream(
        &self,
        device_id: &str,
        spec: StreamSpec,
        on_block: AudioBlockCallback,
    ) -> Result<Box<dyn CaptureStream>, RecorderError>;
}

/// A stream returned by `CaptureProvider::open_stream`.
///
/// `stop` and `close` must be idempotent: calling them on a stream that is
/// already stopped or closed returns `Ok(())`.
pub trait CaptureStream: Send {
    fn start(&mut self) -> Result<(), RecorderError>;

    fn stop(&mut self) -> Result<(), RecorderError>;

    /// Release the device. No callback fires after this returns.
    fn close(&mut self) -> Result<(), RecorderError>;
}
