use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::audio_models::{PcmData, StreamSpec};
use crate::models::error::RecorderError;
use crate::processing::wav_format;
use crate::traits::persistence::PcmPersister;

/// Writes a whole take as a 32-bit WAV file in one pass.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [32-bit little-endian samples, interleaved...]
/// ```
///
/// The file is opened with `create_new`, so an existing take is never
/// overwritten even if two writers race for the same name.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavFileWriter;

impl WavFileWriter {
    pub fn new() -> Self {
        Self
    }

    fn write_file(file: File, header: &[u8], body: &[u8]) -> std::io::Result<String> {
        let mut hasher = Sha256::new();
        let mut out = BufWriter::new(file);

        out.write_all(header)?;
        hasher.update(header);
        out.write_all(body)?;
        hasher.update(body);

        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        Ok(hex_encode(&hasher.finalize()))
    }
}

impl PcmPersister for WavFileWriter {
    fn write_wav(&self, path: &Path, spec: &StreamSpec, data: &PcmData) -> Result<String, RecorderError> {
        if data.format() != spec.sample_format {
            return Err(RecorderError::UnsupportedFormat(format!(
                "data is {} but stream is {}",
                data.format(),
                spec.sample_format
            )));
        }

        let body = data.to_le_bytes();
        let data_size = u32::try_from(body.len())
            .ok()
            .filter(|size| *size <= u32::MAX - 36)
            .ok_or_else(|| RecorderError::StorageError("take exceeds the 4 GiB WAV limit".into()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RecorderError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| RecorderError::StorageError(format!("failed to create {}: {}", path.display(), e)))?;

        let header = wav_format::generate_wav_header(spec.sample_rate, spec.sample_format, spec.channels, data_size);

        match Self::write_file(file, &header, &body) {
            Ok(checksum) => Ok(checksum),
            Err(e) => {
                if let Err(rm) = fs::remove_file(path) {
                    log::warn!("Failed to remove partial take {}: {}", path.display(), rm);
                }
                Err(RecorderError::StorageError(format!("write failed: {}", e)))
            }
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
