//! HTTP clients for the services behind the proxy: the downstream node and
//! the private transaction enclave.

mod downstream;
mod enclave;

pub use downstream::{forwarded_headers, relayed_headers, DownstreamClient, DownstreamResponse};
pub use enclave::EnclaveClient;
pub use reqwest::{header, Method, StatusCode, Url};

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Error connecting to the remote endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node answered with a JSON-RPC error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The reply could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The enclave rejected a request
    #[error("Enclave error: {0}")]
    Enclave(String),

    /// General error with context
    #[error("Client error: {0}")]
    Other(String),
}

impl ClientError {
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Convenience function to create an HTTP client whose every request is bounded
/// by `timeout`.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Other(format!("{}", e)))
}

pub(crate) fn parse_url(url: &str) -> Result<Url, ClientError> {
    url.parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let result = parse_url("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
