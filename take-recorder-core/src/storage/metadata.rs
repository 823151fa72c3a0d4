use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::recording_result::TakeMetadata;

/// Path of the sidecar for `take_path`: `X_1.wav` → `X_1.metadata.json`.
pub fn metadata_path(take_path: &Path) -> PathBuf {
    take_path.with_extension("metadata.json")
}

/// Write take metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &TakeMetadata, take_path: &Path) -> Result<(), RecorderError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RecorderError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(take_path), json)
        .map_err(|e| RecorderError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read take metadata from a JSON sidecar file.
pub fn read_metadata(take_path: &Path) -> Result<TakeMetadata, RecorderError> {
    let json = fs::read_to_string(metadata_path(take_path))
        .map_err(|e| RecorderError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: TakeMetadata = serde_json::from_str(&json)
        .map_err(|e| RecorderError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}
