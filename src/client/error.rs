//! Evaluation client errors
//!
//! Timeouts and connection failures stay separate variants so logs can tell
//! them apart, even though users see both as "service unreachable".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Errors that can occur while talking to the evaluation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientError {
    /// No response within the per-call timeout (in seconds)
    Timeout { seconds: u64 },

    /// The service could not be reached at all
    Connect { message: String },

    /// Transport failure after the connection was established
    Network { message: String },

    /// The service answered with a non-success status
    Api {
        status_code: u16,
        detail: Option<String>,
    },

    /// The response body did not match the expected shape
    InvalidResponse { message: String },

    /// The request could not be built (bad endpoint, bad multipart part)
    InvalidRequest { message: String },
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                seconds: timeout.as_secs(),
            }
        } else if err.is_connect() {
            ClientError::Connect {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            ClientError::InvalidRequest {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ClientError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            ClientError::Network {
                message: err.to_string(),
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// Timeouts and connection-level failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout { .. } | ClientError::Connect { .. } | ClientError::Network { .. }
        )
    }

    /// Message supplied by the service, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Timeout { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            ClientError::Connect { message } => {
                write!(f, "Cannot connect to evaluation service: {}", message)
            }
            ClientError::Network { message } => write!(f, "Network error: {}", message),
            ClientError::Api {
                status_code,
                detail,
            } => match detail {
                Some(detail) => write!(f, "Service error ({}): {}", status_code, detail),
                None => write!(f, "Service error ({})", status_code),
            },
            ClientError::InvalidResponse { message } => {
                write!(f, "Invalid response from evaluation service: {}", message)
            }
            ClientError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
        }
    }
}

impl std::error::Error for ClientError {}
