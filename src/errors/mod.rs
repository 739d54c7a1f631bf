/// Unified error handling module
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single call against the remote catalog
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Timeouts, refused connections and unresolvable hosts
    pub fn is_connectivity(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Error body returned by the catalog on non-2xx responses, e.g. `{"detail": "Not found"}`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ServerErrorBody {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// Missing or malformed configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
