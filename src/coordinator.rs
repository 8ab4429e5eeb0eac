//! The execution coordinator.
//!
//! Ties the pieces together: submit a statement batch, run the governance
//! findings through the policy gate, and on an allowed decision spawn a
//! registered polling task whose merged results the caller awaits. Many
//! sessions execute concurrently; stopping one session's tasks never
//! affects another's.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::error::{CourierError, Result};
use crate::gate::{self, GateStatus, PolicyDecision};
use crate::poll::{PollerSettings, PollingTask, ProgressEvent};
use crate::registry::TaskRegistry;
use crate::remote::SessionTransport;
use crate::results::StatementResult;
use crate::session::SessionHandle;
use crate::submit::{ExecutionRequest, Submitter};

/// Per-call execution options.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    /// Opt into resolving unauthorized access interactively instead of
    /// blocking on it.
    pub resolve_unauthorized: bool,
    /// Polling variant for this call site.
    pub poller: PollerSettings,
}

impl ExecuteOptions {
    /// Options for the batch-complete variant (growing backoff, replace).
    pub fn batch_complete(config: &Config) -> Self {
        Self {
            resolve_unauthorized: false,
            poller: PollerSettings::batch_complete(&config.polling),
        }
    }

    /// Options for the incremental variant (fixed interval, append).
    pub fn incremental(config: &Config) -> Self {
        Self {
            resolve_unauthorized: false,
            poller: PollerSettings::incremental(&config.polling),
        }
    }

    /// Opts into resolving unauthorized access interactively.
    pub fn with_resolve_unauthorized(mut self) -> Self {
        self.resolve_unauthorized = true;
        self
    }
}

/// Outcome of one execution attempt.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The gate allowed execution; a polling task is running.
    Started(ExecutionHandle),
    /// The gate requires an out-of-band approval workflow before the same
    /// statements can be resubmitted. The coordinator does not manage
    /// approval state itself.
    ApprovalRequired(PolicyDecision),
    /// The gate blocked execution; no polling task was created.
    Blocked(PolicyDecision),
}

/// Handle to one in-flight execution.
///
/// Dropping the handle does not stop the task; use
/// [`ExecutionCoordinator::stop`] for that.
#[derive(Debug)]
pub struct ExecutionHandle {
    /// The server-assigned request id the task is registered under.
    pub request_id: String,
    /// The allowed decision, still carrying any informational lint results.
    pub decision: PolicyDecision,
    /// Progress events, one per poll, with or without new data.
    pub progress: mpsc::Receiver<ProgressEvent>,
    join: JoinHandle<Option<Vec<StatementResult>>>,
}

impl ExecutionHandle {
    /// Awaits the task's terminal state.
    ///
    /// Returns the merged results on completion, or `None` when the task
    /// was stopped or gave up after repeated poll failures.
    pub async fn wait(self) -> Option<Vec<StatementResult>> {
        match self.join.await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "polling task join failed");
                None
            }
        }
    }
}

/// Coordinates submissions, policy decisions, and result polling.
pub struct ExecutionCoordinator {
    transport: Arc<dyn SessionTransport>,
    registry: Arc<TaskRegistry>,
    config: Config,
}

impl ExecutionCoordinator {
    /// Creates a coordinator with its own empty task registry.
    pub fn new(transport: Arc<dyn SessionTransport>, config: Config) -> Self {
        Self {
            transport,
            registry: Arc::new(TaskRegistry::new()),
            config,
        }
    }

    /// The registry of active tasks.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// The configuration this coordinator was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submits a request, gates it, and on an allowed decision starts a
    /// registered polling task.
    ///
    /// A caller issuing a new execution on a session with a previous one
    /// still polling is responsible for stopping the previous task first;
    /// superseded work is not auto-cancelled.
    pub async fn execute(
        &self,
        session: &SessionHandle,
        request: &ExecutionRequest,
        options: ExecuteOptions,
    ) -> Result<ExecutionOutcome> {
        let ticket = Submitter::new(self.transport.as_ref())
            .submit(session, request)
            .await?;
        let decision = gate::decide(&ticket, options.resolve_unauthorized);

        match decision.status {
            GateStatus::Blocked => Ok(ExecutionOutcome::Blocked(decision)),
            GateStatus::ApprovalRequired => Ok(ExecutionOutcome::ApprovalRequired(decision)),
            GateStatus::Allowed => {
                // The gate blocks any ticket without a request id, so an
                // allowed decision always has one.
                let request_id = ticket.request_id.clone().ok_or_else(|| {
                    CourierError::internal("allowed decision without a request id")
                })?;
                let handle = self.start_polling(&request_id, session, options.poller, decision)?;
                Ok(ExecutionOutcome::Started(handle))
            }
        }
    }

    /// Spawns and registers the polling task for an accepted ticket.
    fn start_polling(
        &self,
        request_id: &str,
        session: &SessionHandle,
        settings: PollerSettings,
        decision: PolicyDecision,
    ) -> Result<ExecutionHandle> {
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = mpsc::channel(self.config.polling.progress_capacity);

        if !self
            .registry
            .register(request_id, session.session_id(), cancel.clone())
        {
            return Err(CourierError::internal(format!(
                "request id '{request_id}' is already registered"
            )));
        }

        let task = PollingTask::new(
            request_id,
            session.session_id(),
            settings,
            Arc::clone(&self.transport),
            cancel,
            progress_tx,
        );

        let registry = Arc::clone(&self.registry);
        let owned_id = request_id.to_string();
        let join = tokio::spawn(async move {
            let outcome = task.run().await;
            registry.unregister(&owned_id);
            outcome.into_results()
        });

        Ok(ExecutionHandle {
            request_id: request_id.to_string(),
            decision,
            progress: progress_rx,
            join,
        })
    }

    /// Stops one in-flight request. No-op if it already terminated.
    pub fn stop(&self, request_id: &str) -> bool {
        self.registry.stop(request_id)
    }

    /// Closes a session: marks the handle destroyed locally and stops every
    /// task of that session, leaving other sessions' tasks running.
    ///
    /// Returns the number of tasks stopped.
    pub fn close_session(&self, session: &SessionHandle) -> usize {
        session.mark_destroyed();
        self.registry.stop_by_session(session.session_id())
    }

    /// Full teardown: stops every task of every session.
    pub fn shutdown(&self) {
        self.registry.stop_all();
    }
}
