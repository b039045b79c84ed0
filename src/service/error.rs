use std::sync::Arc;

use reqwest::StatusCode;

use crate::core::user::UserId;

/// Failure reading from the users service.
///
/// Sources sit behind `Arc` so errors can be cloned into UI messages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("no users service URL is configured")]
    Unconfigured,
    #[error("request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),
    #[error("service returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("user {0} does not exist")]
    NotFound(UserId),
    #[error("unexpected response body: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Arc::new(e))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(Arc::new(e))
    }
}

/// Failure writing a new user to the service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CreateError {
    #[error("no users service URL is configured")]
    Unconfigured,
    #[error("request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),
    #[error("service rejected the user ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
}

impl From<reqwest::Error> for CreateError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Arc::new(e))
    }
}

impl From<serde_json::Error> for CreateError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(Arc::new(e))
    }
}
