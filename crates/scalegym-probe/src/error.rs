//! Error types for endpoints and individual requests.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while parsing a target endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("unsupported scheme `{0}` (only http is supported)")]
    UnsupportedScheme(String),
}

/// Why a single request did not produce a response.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),

    #[error("request failed: {0}")]
    Send(#[source] hyper::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] hyper::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
