use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by gateway client operations.
///
/// Callers can branch on the variant instead of parsing message strings:
/// transport failures, non-success HTTP statuses and undecodable success
/// bodies are kept apart.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed: DNS, connect, TLS or body-read failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    ///
    /// `message` is derived from the response body (a JSON `message` or
    /// `error` field, then the raw text, then the status line itself) and
    /// is exactly what `Display` prints.
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
    },

    /// A success response carried a body that did not decode as the
    /// expected JSON shape.
    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// HTTP status of the failed response, for [`GatewayError::Status`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for gateway client operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
