//! Error types for the Rally client.

/// Error from Rally Web Services API operations.
#[derive(Debug, thiserror::Error)]
pub enum RallyError {
    /// Session could not be established.
    #[error("connection to {url} failed: {reason}")]
    ConnectionFailed {
        /// Normalized base URL the probe targeted.
        url: String,
        /// What went wrong, as reported by the transport.
        reason: String,
    },

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// The query envelope carried service-side errors.
    #[error("query failed: {}", .0.join("; "))]
    Query(Vec<String>),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Attachment content was not valid base64.
    #[error("content decode error: {0}")]
    ContentDecode(#[from] base64::DecodeError),
}
