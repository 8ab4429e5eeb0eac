//! Result polling.
//!
//! One [`PollingTask`] per in-flight request repeatedly fetches results from
//! the remote session until the server reports completion or the task is
//! stopped. Two historical variants (fixed-interval accumulate and
//! growing-backoff batch-complete) are unified behind one task type
//! parameterized by a backoff policy and a merge policy, selected per call
//! site via [`PollerSettings`].

mod backoff;
mod task;

pub use backoff::{BackoffPolicy, BackoffState};
pub use task::PollingTask;

use crate::config::PollingConfig;
use crate::results::StatementResult;

/// How each fetched batch is folded into the task's accumulated results.
///
/// The merge policy also selects the wire shape: `Replace` pairs with the
/// batch-complete endpoint (the server returns an all-or-nothing result
/// list), `Append` with the incremental endpoint (partial batches plus a
/// `finished` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Each batch replaces the previous view; the first non-empty batch is
    /// final.
    Replace,
    /// Each batch is appended in arrival order; the server's `finished`
    /// flag ends the loop.
    Append,
}

/// Per-task polling parameters, chosen at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    /// Delay rule between successive polls.
    pub backoff: BackoffPolicy,
    /// How batches are merged, which also selects the poll endpoint.
    pub merge: MergePolicy,
    /// Consecutive fetch failures tolerated before the task gives up.
    pub max_failures: u32,
}

impl PollerSettings {
    /// The batch-complete variant: growing backoff, replace merge.
    pub fn batch_complete(config: &PollingConfig) -> Self {
        Self {
            backoff: BackoffPolicy::growing(config),
            merge: MergePolicy::Replace,
            max_failures: config.max_poll_failures,
        }
    }

    /// The incremental variant: fixed interval, append merge.
    pub fn incremental(config: &PollingConfig) -> Self {
        Self {
            backoff: BackoffPolicy::fixed(config),
            merge: MergePolicy::Append,
            max_failures: config.max_poll_failures,
        }
    }
}

/// Progress notification emitted after every poll, with or without new data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// The request being polled.
    pub request_id: String,
    /// 1-based count of polls issued so far.
    pub poll_count: u64,
    /// Number of results the poll just delivered.
    pub new_results: usize,
    /// True when this was the final poll.
    pub finished: bool,
}

/// Terminal state of a polling task.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The server reported completion; carries the merged results.
    Finished(Vec<StatementResult>),
    /// The task was stopped from outside; not an error.
    Stopped,
    /// Too many consecutive fetch failures; absorbed, not propagated.
    Errored,
}

impl PollOutcome {
    /// Collapses the outcome to the caller-facing view: results on
    /// completion, "no result" otherwise.
    pub fn into_results(self) -> Option<Vec<StatementResult>> {
        match self {
            Self::Finished(results) => Some(results),
            Self::Stopped | Self::Errored => None,
        }
    }
}
