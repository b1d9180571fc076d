//! Typed errors for the SQL and CRUD layers, plus the JSON error envelope.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// A query that had to produce a row produced none.
///
/// The message names the operation, the table and the key, e.g. `fetch_id: "todos" : 42`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequireSomeError {
    pub message: String,
}

impl RequireSomeError {
    pub fn new(message: impl Into<String>) -> Self {
        RequireSomeError {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CrudError {
    #[error(transparent)]
    RequireSome(#[from] RequireSomeError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("encode: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("model must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl CrudError {
    /// True when the error is the "required row missing" sentinel rather than a driver failure.
    pub fn is_require_some(&self) -> bool {
        matches!(self, CrudError::RequireSome(_))
    }
}

/// Serializable wrapper around a caught failure, rendered as the body of a 500 response.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Pretty `Debug` rendering of the wrapped error.
    pub error_dump: String,
    /// File of the call that wrapped the error.
    pub file: String,
    /// Line of the call that wrapped the error.
    pub line: u32,
    /// `Display` rendering of the wrapped error.
    pub message: String,
}

impl ApiError {
    /// Wrap `error`, recording the caller's location.
    #[track_caller]
    pub fn new<E>(error: &E) -> Self
    where
        E: fmt::Debug + fmt::Display + ?Sized,
    {
        Self::with_location(error, Location::caller())
    }

    pub fn with_location<E>(error: &E, location: &Location<'_>) -> Self
    where
        E: fmt::Debug + fmt::Display + ?Sized,
    {
        ApiError {
            error_dump: format!("{:#?}", error),
            file: location.file().to_string(),
            line: location.line(),
            message: error.to_string(),
        }
    }
}
