//! Error types for the studio workflow.

/// Errors that can occur while selecting images, generating, or exporting.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Bad or unreadable input file (non-image MIME type, failed read).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Request rejected before any provider call (e.g. empty prompt).
    #[error("{0}")]
    Validation(String),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Provider returned a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Well-formed provider response with no inline image part.
    #[error("no image data found in response")]
    NoImageReturned,

    /// Failed to decode base64 or data-URL payload.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g. exporting a result file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Returns true if this error came from the remote provider or its
    /// transport, as opposed to local input validation.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Api { .. } | Self::Network(_) | Self::NoImageReturned
        )
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
