//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with anything other than 200.
    #[error("Video service returned HTTP {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether the request gave up because the timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Network(e) if e.is_timeout())
    }
}
