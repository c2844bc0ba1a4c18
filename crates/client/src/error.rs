//! Error type for dashboard client calls.

/// Failures talking to the pulseboard API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout, or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the bearer token.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status, with the server's message when it sent one.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
