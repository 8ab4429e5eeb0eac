//! Wire-level request and reply shapes for the two remote endpoints.
//!
//! These shapes are logical, not wire-exact; the transport implementation
//! decides how they are framed on the network.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gate::{ResourceRef, Violation};
use crate::results::StatementResult;

/// Payload of one call to the "execute" endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Raw statement text, possibly containing several statements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_text: Option<String>,
    /// Pre-split statements, used instead of `statement_text` when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<String>,
    /// Server-side row limit per statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_limit: Option<u32>,
    /// Ask the server to split `statement_text` into statements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<bool>,
    /// Opaque per-request options forwarded verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_options: Map<String, Value>,
}

/// One statement as the server decomposed and rewrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDecomposition {
    /// Server-assigned id of the statement within the request.
    pub sql_id: String,
    /// The statement as submitted.
    pub original_sql: String,
    /// The statement as the server will actually run it.
    pub executed_sql: String,
    /// Governance violations scoped to this statement.
    #[serde(default)]
    pub violated_rules: Vec<Violation>,
}

/// Reply of the "execute" endpoint.
///
/// An absent `request_id` means the submission was refused before queuing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitReply {
    /// Id to poll results under; absent when blocked before queuing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Per-statement decomposition of the submission.
    #[serde(default)]
    pub statements: Vec<StatementDecomposition>,
    /// Violations not tied to a specific queued statement.
    #[serde(default)]
    pub root_violations: Vec<Violation>,
    /// Resources the principal is not authorized to access.
    #[serde(default)]
    pub unauthorized_resources: Vec<ResourceRef>,
    /// Server-side refusal message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Server hint that an approval workflow is mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_required: Option<bool>,
}

/// Reply of the incremental "poll" endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncrementalReply {
    /// True once the server will produce no further results.
    #[serde(default)]
    pub finished: bool,
    /// Partial batch of statement results; may be empty.
    #[serde(default)]
    pub results: Vec<StatementResult>,
    /// Statement currently executing, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Id of the statement currently executing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_id: Option<String>,
    /// Server-side trace id for the current round trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}
