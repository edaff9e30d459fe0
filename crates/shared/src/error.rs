use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

/// Error body returned by the authority's HTTP endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Inconsistency between the local event table and its wire names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventTableError {
    #[error("event name {0} is mapped more than once")]
    Duplicate(&'static str),
    #[error("event name {0} does not resolve back to its own type")]
    Unresolvable(&'static str),
    #[error("event name {name} is listed at slot {position} instead of its own")]
    Misplaced { name: &'static str, position: usize },
}
