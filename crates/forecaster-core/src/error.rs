//! Transport-level failures shared by the upstream clients.
//!
//! HTTP status handling stays with each client; this module only sorts out
//! what went wrong below the status line.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    /// Body could not be read or decoded
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// Client or request could not be built (bad URL, TLS backend, ...)
    #[error("Request setup failed: {0}")]
    Setup(String),
}

/// Sort a reqwest error into a [`NetworkError`].
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() || self.is_body() {
            NetworkError::InvalidResponse(self.to_string())
        } else if self.is_builder() {
            NetworkError::Setup(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
