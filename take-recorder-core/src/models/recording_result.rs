use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::audio_models::{SampleFormat, StreamSpec};
use super::error::RecorderError;
use super::tags::TagTuple;

/// Result returned when a take is written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTake {
    pub file_path: PathBuf,
    pub tags: TagTuple,
    pub frames: u64,
    pub duration_secs: f64,
    pub checksum: String,
    pub metadata: TakeMetadata,
}

/// How a call to `stop()` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The session was not recording; nothing happened.
    NotRecording,
    /// The stream delivered no samples.
    NoData,
    /// A discard was requested for this take.
    Discarded,
    Saved(SavedTake),
    /// Naming or persisting failed. The captured audio is gone.
    Failed(RecorderError),
}

impl StopOutcome {
    pub fn saved(&self) -> Option<&SavedTake> {
        match self {
            Self::Saved(take) => Some(take),
            _ => None,
        }
    }
}

/// Sidecar metadata describing a saved take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeMetadata {
    pub id: String,
    pub tags: TagTuple,
    pub device_id: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
    pub duration_secs: f64,
    pub file_path: String,
    pub checksum: String,
    pub created_at: String,
}

impl TakeMetadata {
    pub fn new(
        tags: &TagTuple,
        device_id: &str,
        spec: &StreamSpec,
        duration_secs: f64,
        file_path: &str,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tags: tags.clone(),
            device_id: device_id.to_string(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            sample_format: spec.sample_format,
            duration_secs,
            file_path: file_path.to_string(),
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
