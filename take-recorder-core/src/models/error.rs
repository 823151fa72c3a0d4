use thiserror::Error;

/// Errors that can occur while capturing, naming or persisting a take.
///
/// Every variant is recoverable: callers turn them into status events
/// rather than terminating the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("capture stream failed: {0}")]
    StreamFailed(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("invalid auto-mode timing: {0}")]
    InvalidSchedule(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl RecorderError {
    /// True for failures reported by the capture driver (device or stream).
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotAvailable(_) | Self::StreamFailed(_) | Self::UnsupportedFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let err = RecorderError::StreamFailed("device busy".into());
        assert_eq!(err.to_string(), "capture stream failed: device busy");

        let err = RecorderError::InvalidSchedule("wait must be a positive integer".into());
        assert!(err.to_string().starts_with("invalid auto-mode timing"));
    }

    #[test]
    fn device_errors_are_classified() {
        assert!(RecorderError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(RecorderError::UnsupportedFormat("u8".into()).is_device_error());
        assert!(!RecorderError::StorageError("disk full".into()).is_device_error());
    }
}
