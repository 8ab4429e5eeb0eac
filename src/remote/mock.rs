//! Mock transports for testing.
//!
//! `MockTransport` is scriptable: tests queue up poll replies (including
//! failures) and inspect call counts. `FailingTransport` fails every call
//! with a transport error.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{IncrementalReply, SessionTransport, StatementDecomposition, SubmitReply, SubmitRequest};
use crate::error::{CourierError, Result};
use crate::results::{StatementResult, StatementStatus};

/// A mock transport that returns scripted replies.
///
/// With no scripting, `submit` accepts everything under request id
/// `"mock-r1"` and both poll shapes report completion with a single
/// successful statement result on the first fetch.
pub struct MockTransport {
    submit_reply: Mutex<Option<SubmitReply>>,
    batch_replies: Mutex<VecDeque<Result<Vec<StatementResult>>>>,
    incremental_replies: Mutex<VecDeque<Result<IncrementalReply>>>,
    submit_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockTransport {
    /// Creates a mock transport with default accept-everything behavior.
    pub fn new() -> Self {
        Self {
            submit_reply: Mutex::new(None),
            batch_replies: Mutex::new(VecDeque::new()),
            incremental_replies: Mutex::new(VecDeque::new()),
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Scripts the reply returned by the next and all further submits.
    pub fn set_submit_reply(&self, reply: SubmitReply) {
        *self.submit_reply.lock().unwrap() = Some(reply);
    }

    /// Queues one batch-complete poll reply (empty = "not ready").
    pub fn push_batch(&self, results: Vec<StatementResult>) {
        self.batch_replies.lock().unwrap().push_back(Ok(results));
    }

    /// Queues one batch-complete poll failure.
    pub fn push_batch_error(&self) {
        self.batch_replies
            .lock()
            .unwrap()
            .push_back(Err(CourierError::transport("scripted fetch failure")));
    }

    /// Queues one incremental poll reply.
    pub fn push_incremental(&self, reply: IncrementalReply) {
        self.incremental_replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queues one incremental poll failure.
    pub fn push_incremental_error(&self) {
        self.incremental_replies
            .lock()
            .unwrap()
            .push_back(Err(CourierError::transport("scripted fetch failure")));
    }

    /// Number of submit calls made so far.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of fetch calls (either shape) made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Builds the default accept-everything reply for a submission.
    fn default_submit_reply(request: &SubmitRequest) -> SubmitReply {
        let sql = request
            .statement_text
            .clone()
            .or_else(|| request.statements.first().cloned())
            .unwrap_or_default();
        SubmitReply {
            request_id: Some("mock-r1".to_string()),
            statements: vec![StatementDecomposition {
                sql_id: "q1".to_string(),
                original_sql: sql.clone(),
                executed_sql: sql,
                violated_rules: vec![],
            }],
            ..Default::default()
        }
    }

    fn default_final_batch() -> Vec<StatementResult> {
        vec![StatementResult::new("q1", StatementStatus::Success)]
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionTransport for MockTransport {
    async fn submit(&self, _target: &str, request: &SubmitRequest) -> Result<SubmitReply> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.submit_reply.lock().unwrap().clone();
        Ok(scripted.unwrap_or_else(|| Self::default_submit_reply(request)))
    }

    async fn fetch_batch(&self, _request_id: &str) -> Result<Vec<StatementResult>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.batch_replies.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok(Self::default_final_batch()),
        }
    }

    async fn fetch_incremental(&self, _request_id: &str) -> Result<IncrementalReply> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.incremental_replies.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok(IncrementalReply {
                finished: true,
                results: Self::default_final_batch(),
                ..Default::default()
            }),
        }
    }
}

/// A transport where every call fails, for error-path testing.
pub struct FailingTransport;

#[async_trait]
impl SessionTransport for FailingTransport {
    async fn submit(&self, _target: &str, _request: &SubmitRequest) -> Result<SubmitReply> {
        Err(CourierError::transport("submit failed"))
    }

    async fn fetch_batch(&self, _request_id: &str) -> Result<Vec<StatementResult>> {
        Err(CourierError::transport("fetch failed"))
    }

    async fn fetch_incremental(&self, _request_id: &str) -> Result<IncrementalReply> {
        Err(CourierError::transport("fetch failed"))
    }
}
