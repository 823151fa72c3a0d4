use std::path::PathBuf;

use super::audio_models::{SampleFormat, StreamSpec};

/// Configuration shared by every take a session records.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfiguration {
    /// Capture sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Number of interleaved channels (default: 1). Valid values: 1..=8.
    pub channels: u16,

    /// Sample format requested from the driver and written to disk.
    pub sample_format: SampleFormat,

    /// Directory where takes are written.
    pub output_directory: PathBuf,

    /// Write a `.metadata.json` sidecar next to every saved take.
    pub write_metadata: bool,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if !(1..=8).contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        Ok(())
    }

    pub fn stream_spec(&self) -> StreamSpec {
        StreamSpec {
            sample_rate: self.sample_rate,
            channels: self.channels,
            sample_format: self.sample_format,
        }
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            sample_format: SampleFormat::F32,
            output_directory: PathBuf::from("recordings"),
            write_metadata: false,
        }
    }
}
