//! Input device enumeration via cpal.
//!
//! cpal has no stable device identifiers, so a device's name doubles as
//! its id. An empty id or `"default"` selects the host's default input.

use cpal::traits::{DeviceTrait, HostTrait};

use take_recorder_core::models::audio_models::AudioSource;
use take_recorder_core::models::error::RecorderError;

/// Device id that always resolves to the default input.
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Audio input enumerator over the default cpal host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input devices. The default input is flagged.
    pub fn list_input_devices(&self) -> Result<Vec<AudioSource>, RecorderError> {
        let default_name = self.default_input_name();
        let devices = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::DeviceNotAvailable(format!("failed to enumerate inputs: {}", e)))?;

        let mut sources = Vec::new();
        for (i, device) in devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| format!("Input {}", i));
            let is_default = default_name.as_deref() == Some(name.as_str());
            sources.push(AudioSource {
                id: name.clone(),
                name,
                is_default,
            });
        }
        Ok(sources)
    }

    /// Name of the host's default input device, if there is one.
    pub fn default_input_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }

    /// Resolve a device id to a cpal input device.
    pub fn find_input_device(&self, device_id: &str) -> Result<cpal::Device, RecorderError> {
        if is_default_id(device_id) {
            return self
                .host
                .default_input_device()
                .ok_or_else(|| RecorderError::DeviceNotAvailable("no default input device".into()));
        }

        let mut devices = self
            .host
            .input_devices()
            .map_err(|e| RecorderError::DeviceNotAvailable(format!("failed to enumerate inputs: {}", e)))?;

        devices
            .find(|d| d.name().map(|n| n == device_id).unwrap_or(false))
            .ok_or_else(|| RecorderError::DeviceNotAvailable(format!("input device not found: {}", device_id)))
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_default_id(device_id: &str) -> bool {
    let id = device_id.trim();
    id.is_empty() || id.eq_ignore_ascii_case(DEFAULT_DEVICE_ID)
}
