//! Unified error handling for the activity-map library.
//!
//! Every fallible operation in the crate returns [`Result`]. The sync pipeline
//! only treats errors as fatal at the top level; per-activity enrichment errors
//! are logged and degrade to the summary record.

use thiserror::Error;

/// Unified error type for activity-map operations.
#[derive(Debug, Error)]
pub enum ActivityMapError {
    /// Missing or invalid configuration (credentials, bounds, paths)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// OAuth authorization or token refresh failed
    #[error("Authorization failed: {message}")]
    Auth { message: String },

    /// HTTP/API error
    #[error("{}", fmt_http(.message, .status_code))]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    /// Response body or stored JSON could not be parsed
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Encoded polyline could not be decoded
    #[error("Polyline for activity {activity_id} could not be decoded: {message}")]
    Polyline { activity_id: u64, message: String },

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn fmt_http(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("HTTP error ({}): {}", code, message),
        None => format!("HTTP error: {}", message),
    }
}

impl ActivityMapError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// HTTP status code, when the error came from a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ActivityMapError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<serde_json::Error> for ActivityMapError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

/// Result type alias for activity-map operations.
pub type Result<T> = std::result::Result<T, ActivityMapError>;
