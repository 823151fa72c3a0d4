use std::path::Path;

use crate::models::audio_models::{PcmData, StreamSpec};
use crate::models::error::RecorderError;

/// Writes a finished take to disk.
pub trait PcmPersister: Send + Sync {
    /// Persist `data` as a WAV file at `path` and return its SHA-256 checksum
    /// as lowercase hex.
    ///
    /// Must fail rather than overwrite if `path` already exists.
    fn write_wav(&self, path: &Path, spec: &StreamSpec, data: &PcmData) -> Result<String, RecorderError>;
}
