use std::path::PathBuf;

use clap::Parser;

use take_recorder_core::models::audio_models::SampleFormat;
use take_recorder_core::models::config::CaptureConfiguration;
use take_recorder_core::models::tags::TagTuple;

use crate::device_enumerator::DEFAULT_DEVICE_ID;

#[derive(Debug, Parser)]
#[command(name = "take-recorder")]
#[command(about = "Record tagged takes from an audio input to WAV files")]
pub struct Args {
    /// List input devices and exit
    #[arg(short, long)]
    pub list_devices: bool,

    /// Input device name ("default" for the system default)
    #[arg(short, long, default_value = DEFAULT_DEVICE_ID)]
    pub device: String,

    /// Directory takes are written to
    #[arg(short, long, default_value = "recordings")]
    pub output_dir: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48_000)]
    pub sample_rate: u32,

    /// Interleaved channel count (1-8)
    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Sample format written to disk (f32 or i32)
    #[arg(long, default_value = "f32")]
    pub format: SampleFormat,

    /// Write a .metadata.json sidecar next to each take
    #[arg(long)]
    pub metadata: bool,

    /// Auto mode: seconds to wait before each take
    #[arg(short, long, default_value = "3")]
    pub wait: String,

    /// Auto mode: seconds to record per take
    #[arg(short, long, default_value = "5")]
    pub record: String,

    /// Start in auto mode
    #[arg(short, long)]
    pub auto: bool,

    /// Tags naming the take, e.g. instrument chord position knob player
    #[arg(default_values = ["A", "open", "1", "1"])]
    pub tags: Vec<String>,
}

impl Args {
    pub fn capture_config(&self) -> CaptureConfiguration {
        CaptureConfiguration {
            sample_rate: self.sample_rate,
            channels: self.channels,
            sample_format: self.format,
            output_directory: self.output_dir.clone(),
            write_metadata: self.metadata,
        }
    }

    pub fn tag_tuple(&self) -> TagTuple {
        self.tags.iter().map(String::as_str).collect()
    }
}
