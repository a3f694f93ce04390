//! Error types for mask editing, compositing and service exchanges

use thiserror::Error;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Error types surfaced by the editor engine and its collaborators
#[derive(Error, Debug)]
pub enum EditorError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image codec errors bubbled up from the `image` crate
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Input bytes that could not be decoded into an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Raster encoding failures (PNG, TIFF, WebP, data URLs)
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport failures talking to the background-removal service
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by the background-removal service itself
    #[error("Service error: {0}")]
    Service(String),

    /// Operation not valid in the current session phase
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic processing failure
    #[error("Processing error: {0}")]
    Processing(String),
}

impl EditorError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new service error
    pub fn service<S: Into<String>>(msg: S) -> Self {
        Self::Service(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a network error carrying the underlying cause
    pub fn network_error<S: Into<String>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.into(), error))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Message suitable for the session's visible error banner
    ///
    /// Service errors carry the service's own text; everything else keeps
    /// the full display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = EditorError::invalid_config("test config error");
        assert!(matches!(err, EditorError::InvalidConfig(_)));

        let err = EditorError::decode("not an image");
        assert!(matches!(err, EditorError::Decode(_)));

        let err = EditorError::invalid_state("submission already in flight");
        assert!(matches!(err, EditorError::InvalidState(_)));
    }

    #[test]
    fn test_error_display() {
        let err = EditorError::invalid_config("Invalid service URL");
        assert_eq!(err.to_string(), "Invalid configuration: Invalid service URL");
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = EditorError::file_io_error("write export", Path::new("/out/result.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("write export"));
        assert!(error_string.contains("/out/result.png"));

        let err = EditorError::config_value_error("max display width", 0, "1-16384", Some(540));
        let error_string = err.to_string();
        assert!(error_string.contains("max display width"));
        assert!(error_string.contains("1-16384"));
        assert!(error_string.contains("Recommended: 540"));

        let err = EditorError::network_error("Failed to reach service", "connection refused");
        assert_eq!(
            err.to_string(),
            "Network error: Failed to reach service: connection refused"
        );
    }

    #[test]
    fn test_user_message() {
        assert_eq!(EditorError::service("GPU busy").user_message(), "GPU busy");
        assert!(EditorError::network_error("POST", "timeout")
            .user_message()
            .starts_with("Network error"));
    }
}
