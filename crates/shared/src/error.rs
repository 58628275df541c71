use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for remote resource operations. `Validation` is the only
/// variant carrying per-field detail; everything else is rendered as a single
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("server rejected {} field(s)", field_errors.len())]
    Validation { field_errors: Vec<(String, String)> },
}

/// Error body shape emitted by the remote store on rejected requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, String>,
}
