use thiserror::Error;

/// Errors surfaced by the capture screen and its collaborators.
///
/// None of these are fatal: every failing operation leaves the screen in a
/// well-defined state it can continue from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    #[error("Permission denied error: {0}")]
    PermissionDenied(String),
    #[error("Camera device not found: {0}")]
    DeviceUnavailable(String),
    #[error("Capture error: {0}")]
    CaptureFailure(String),
    #[error("Recording error: {0}")]
    RecordingFailure(String),
    #[error("Upload error: {0}")]
    UploadFailure(String),
    #[error("Focus error: {0}")]
    FocusFailure(String),
    #[error("Invalid screen state: {0}")]
    InvalidState(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for CameraError {
    fn from(e: std::io::Error) -> Self {
        CameraError::IoError(e.to_string())
    }
}

impl From<toml::de::Error> for CameraError {
    fn from(e: toml::de::Error) -> Self {
        CameraError::ConfigError(format!("Failed to parse config file: {}", e))
    }
}

impl From<config::ConfigError> for CameraError {
    fn from(e: config::ConfigError) -> Self {
        CameraError::ConfigError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CameraError::CaptureFailure("sensor busy".to_string());
        assert_eq!(err.to_string(), "Capture error: sensor busy");

        let err = CameraError::DeviceUnavailable("back".to_string());
        assert!(err.to_string().contains("back"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CameraError = io.into();
        assert!(matches!(err, CameraError::IoError(ref m) if m.contains("gone")));
    }
}
