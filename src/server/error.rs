//! Error type for backend requests.

use std::fmt;
use std::io;

/// A request that could not be served. Each variant maps to one HTTP status
/// and is sent to the client as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge,
    /// The data file could not be written.
    Storage(io::Error),
    /// The handler itself failed.
    Internal,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge => 413,
            ApiError::Storage(_) | ApiError::Internal => 500,
        }
    }

    /// Message safe to show to clients. Storage details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::PayloadTooLarge => "request too large".to_string(),
            ApiError::Storage(_) => "could not save data".to_string(),
            ApiError::Internal => "internal error".to_string(),
        }
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("not found".to_string())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("unauthenticated".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Storage(e) => write!(f, "storage error: {}", e),
            other => write!(f, "{} {}", other.status(), other.public_message()),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ApiError {
    fn from(e: io::Error) -> Self {
        ApiError::Storage(e)
    }
}
