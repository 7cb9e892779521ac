//! Error types shared across MouseKeys crates.

/// Top-level error type for MouseKeys operations.
#[derive(Debug, thiserror::Error)]
pub enum MouseKeysError {
    /// The platform keyboard-capture resource could not be acquired
    /// (permission denied, device missing, hook registration failed).
    #[error("Keyboard capture unavailable: {message}")]
    CaptureUnavailable { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Actuator error: {message}")]
    Actuator { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MouseKeysError.
pub type MouseKeysResult<T> = Result<T, MouseKeysError>;

impl MouseKeysError {
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn actuator(msg: impl Into<String>) -> Self {
        Self::Actuator {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error means the capture feature cannot run at all.
    pub fn is_capture_unavailable(&self) -> bool {
        matches!(self, Self::CaptureUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_unavailable_message_names_the_cause() {
        let err = MouseKeysError::capture_unavailable("no keyboard device");
        assert!(err.is_capture_unavailable());
        assert_eq!(
            err.to_string(),
            "Keyboard capture unavailable: no keyboard device"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MouseKeysError = io.into();
        assert!(!err.is_capture_unavailable());
        assert_eq!(err.to_string(), "denied");
    }
}
