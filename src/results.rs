//! Statement results and result-shape normalization.
//!
//! The remote side reports one result per executed statement. Older server
//! builds omit the originating request id on individual rows, so the
//! normalizer stamps it in for downstream correlation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Terminal status of a single executed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementStatus {
    /// The statement ran to completion.
    Success,
    /// The statement failed on the server.
    Failed,
    /// The statement was cancelled before completion.
    Cancelled,
    /// The statement is still executing (only seen in partial batches).
    Running,
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// The result of one statement within an execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Server-assigned id of the statement within the request.
    pub sql_id: String,
    /// Terminal status reported by the server.
    pub status: StatementStatus,
    /// Opaque result payload (rows, messages, affected counts).
    #[serde(default)]
    pub payload: Value,
    /// Server-side trace id for this statement, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Originating request id; may be absent on the wire and stamped locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl StatementResult {
    /// Creates a result with the given id and status and an empty payload.
    pub fn new(sql_id: impl Into<String>, status: StatementStatus) -> Self {
        Self {
            sql_id: sql_id.into(),
            status,
            payload: Value::Null,
            trace_id: None,
            request_id: None,
        }
    }
}

/// Stamps `request_id` onto every result that lacks one.
///
/// Results that already carry a request id are left untouched; the server's
/// own correlation wins over the local guess.
pub fn stamp_request_id(results: &mut [StatementResult], request_id: &str) {
    for result in results.iter_mut() {
        if result.request_id.is_none() {
            result.request_id = Some(request_id.to_string());
        }
    }
}
