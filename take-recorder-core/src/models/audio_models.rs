use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric format of captured samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 32-bit IEEE float, nominal range -1.0..=1.0.
    F32,
    /// 32-bit signed integer PCM.
    I32,
}

impl SampleFormat {
    pub fn bits_per_sample(&self) -> u16 {
        32
    }

    pub fn bytes_per_sample(&self) -> usize {
        4
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => f.write_str("f32"),
            Self::I32 => f.write_str("i32"),
        }
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f32" | "float" | "float32" => Ok(Self::F32),
            "i32" | "int" | "int32" => Ok(Self::I32),
            other => Err(format!("unknown sample format: {}", other)),
        }
    }
}

/// Format of the capture stream a session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
}

/// One chunk of interleaved samples as delivered by the driver callback.
#[derive(Debug, Clone, PartialEq)]
pub enum PcmBlock {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl PcmBlock {
    pub fn format(&self) -> SampleFormat {
        match self {
            Self::F32(_) => SampleFormat::F32,
            Self::I32(_) => SampleFormat::I32,
        }
    }

    /// Number of samples across all channels.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contiguous PCM produced by draining a capture buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum PcmData {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl PcmData {
    pub fn format(&self) -> SampleFormat {
        match self {
            Self::F32(_) => SampleFormat::F32,
            Self::I32(_) => SampleFormat::I32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Little-endian byte image of the samples, as stored in a WAV data chunk.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() * self.format().bytes_per_sample());
        match self {
            Self::F32(samples) => {
                for s in samples {
                    bytes.extend_from_slice(&s.to_le_bytes());
                }
            }
            Self::I32(samples) => {
                for s in samples {
                    bytes.extend_from_slice(&s.to_le_bytes());
                }
            }
        }
        bytes
    }
}

/// An input device the front end can offer for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}
