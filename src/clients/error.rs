//! Error types for the Order Query Service.

use crate::model::ShapeError;
use thiserror::Error;

/// Errors that can occur while querying orders.
///
/// Every variant is recoverable from the tracker's point of view: a failed poll cycle
/// degrades the exposed state to "no order" and the next cycle tries again.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// The backend has no order for the requested target.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status other than 404.
    #[error("Unexpected response status: {0}")]
    Status(u16),

    /// The response body could not be decoded or failed shape validation.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<ShapeError> for QueryError {
    fn from(e: ShapeError) -> Self {
        QueryError::Malformed(e.to_string())
    }
}

impl From<String> for QueryError {
    fn from(msg: String) -> Self {
        QueryError::Transport(msg)
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            QueryError::Malformed(e.to_string())
        } else {
            QueryError::Transport(e.to_string())
        }
    }
}
