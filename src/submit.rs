//! Execution submission.
//!
//! Sends a statement batch to the remote "execute" endpoint and turns the
//! reply into an [`ExecutionTicket`]. Submission is never retried here: the
//! endpoint is not idempotent, and a duplicated submit could duplicate
//! server-side effects. Retry policy belongs to the caller.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CourierError, Result};
use crate::gate::{ResourceRef, Violation};
use crate::remote::{SessionTransport, StatementDecomposition, SubmitReply, SubmitRequest};
use crate::session::SessionHandle;

/// A statement batch to execute, plus its execution options.
///
/// Immutable once submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    /// The statements to run.
    pub input: StatementInput,
    /// Server-side row limit per statement.
    pub query_limit: Option<u32>,
    /// Ask the server to split raw text into statements.
    pub split_statements: bool,
    /// Opaque per-request options forwarded verbatim.
    pub extra_options: Map<String, Value>,
}

/// The statements of a request, either as raw text or pre-split.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementInput {
    /// Raw statement text, possibly containing several statements.
    Text(String),
    /// Statements already split by the caller.
    Structured(Vec<String>),
}

impl ExecutionRequest {
    /// Creates a request from raw statement text.
    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            input: StatementInput::Text(sql.into()),
            query_limit: None,
            split_statements: false,
            extra_options: Map::new(),
        }
    }

    /// Creates a request from pre-split statements.
    pub fn statements(statements: Vec<String>) -> Self {
        Self {
            input: StatementInput::Structured(statements),
            query_limit: None,
            split_statements: false,
            extra_options: Map::new(),
        }
    }

    /// Sets the server-side row limit per statement.
    pub fn with_query_limit(mut self, limit: u32) -> Self {
        self.query_limit = Some(limit);
        self
    }

    /// Asks the server to split raw text into statements.
    pub fn with_split(mut self) -> Self {
        self.split_statements = true;
        self
    }

    /// Attaches an opaque option forwarded verbatim to the server.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_options.insert(key.into(), value);
        self
    }

    /// Builds the wire payload for this request.
    fn to_wire(&self) -> SubmitRequest {
        let (statement_text, statements) = match &self.input {
            StatementInput::Text(sql) => (Some(sql.clone()), Vec::new()),
            StatementInput::Structured(list) => (None, list.clone()),
        };
        SubmitRequest {
            statement_text,
            statements,
            query_limit: self.query_limit,
            split: self.split_statements.then_some(true),
            extra_options: self.extra_options.clone(),
        }
    }
}

/// The immediate response to a submission, before any result data exists.
///
/// Produced exactly once per submission. An absent `request_id` means the
/// server refused to queue the statements; the policy gate turns that into
/// a blocked decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionTicket {
    /// Id to poll results under; absent when blocked before queuing.
    pub request_id: Option<String>,
    /// Per-statement decomposition of the submission.
    pub statements: Vec<StatementDecomposition>,
    /// Violations not tied to a specific queued statement.
    pub root_violations: Vec<Violation>,
    /// Resources the principal is not authorized to access.
    pub unauthorized_resources: Vec<ResourceRef>,
    /// Server-side refusal message.
    pub error_message: Option<String>,
    /// Server hint that an approval workflow is mandatory.
    pub approval_required: bool,
}

impl From<SubmitReply> for ExecutionTicket {
    fn from(reply: SubmitReply) -> Self {
        Self {
            request_id: reply.request_id,
            statements: reply.statements,
            root_violations: reply.root_violations,
            unauthorized_resources: reply.unauthorized_resources,
            error_message: reply.error_message,
            approval_required: reply.approval_required.unwrap_or(false),
        }
    }
}

/// Submits execution requests against a session.
pub struct Submitter<'a> {
    transport: &'a dyn SessionTransport,
}

impl<'a> Submitter<'a> {
    /// Creates a submitter backed by the given transport.
    pub fn new(transport: &'a dyn SessionTransport) -> Self {
        Self { transport }
    }

    /// Submits the request on the given session and returns its ticket.
    ///
    /// Fails fast with `SessionDestroyed` when the session is already marked
    /// destroyed locally; in that case no network call is made. A transport
    /// failure produces no ticket and is not retried.
    pub async fn submit(
        &self,
        session: &SessionHandle,
        request: &ExecutionRequest,
    ) -> Result<ExecutionTicket> {
        if session.is_destroyed() {
            return Err(CourierError::session_destroyed(format!(
                "session '{}' is destroyed",
                session.session_id()
            )));
        }

        let target = session.target(None);
        let reply = self.transport.submit(&target, &request.to_wire()).await?;
        debug!(
            target = %target,
            request_id = reply.request_id.as_deref().unwrap_or("<none>"),
            statements = reply.statements.len(),
            "submitted execution request"
        );
        Ok(reply.into())
    }
}
