//! The polling state machine.
//!
//! A task moves Idle → Polling on start and ends in one of three terminal
//! states: Finished (server reported completion), Stopped (cancelled from
//! outside), or Errored (too many consecutive fetch failures). Poll-level
//! failures are absorbed into the terminal state rather than propagated; a
//! poller runs unattended and must not crash its host on a network blip.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{BackoffState, MergePolicy, PollOutcome, PollerSettings, ProgressEvent};
use crate::error::Result;
use crate::remote::SessionTransport;
use crate::results::{stamp_request_id, StatementResult};

/// One in-flight request's poll loop.
///
/// The task owns its mutable state exclusively; the outside world interacts
/// with it only through the cancellation token and the progress channel.
pub struct PollingTask {
    request_id: String,
    session_id: String,
    settings: PollerSettings,
    transport: Arc<dyn SessionTransport>,
    cancel: CancellationToken,
    progress: mpsc::Sender<ProgressEvent>,
}

/// One fetch, normalized across the two wire shapes.
struct Fetched {
    finished: bool,
    batch: Vec<StatementResult>,
}

impl PollingTask {
    /// Creates a task for the given request.
    pub fn new(
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        settings: PollerSettings,
        transport: Arc<dyn SessionTransport>,
        cancel: CancellationToken,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            session_id: session_id.into(),
            settings,
            transport,
            cancel,
            progress,
        }
    }

    /// The request this task polls for.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The session the request runs on.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Runs the poll loop to a terminal state.
    ///
    /// The first fetch is issued immediately; the backoff delay only applies
    /// between polls. The stop signal is honored before each fetch, during
    /// it, and after it returns, so a stop that races a fetch mid-flight
    /// still wins.
    pub async fn run(self) -> PollOutcome {
        let mut backoff = self.settings.backoff.state();
        let mut accumulated: Vec<StatementResult> = Vec::new();
        let mut consecutive_failures: u32 = 0;
        let mut poll_count: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return self.stopped();
            }

            poll_count += 1;
            let fetched = tokio::select! {
                _ = self.cancel.cancelled() => return self.stopped(),
                fetched = self.fetch_once() => fetched,
            };
            if self.cancel.is_cancelled() {
                return self.stopped();
            }

            match fetched {
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        request_id = %self.request_id,
                        failures = consecutive_failures,
                        error = %e,
                        "poll fetch failed"
                    );
                    if consecutive_failures >= self.settings.max_failures {
                        return PollOutcome::Errored;
                    }
                }
                Ok(Fetched {
                    finished,
                    mut batch,
                }) => {
                    consecutive_failures = 0;
                    stamp_request_id(&mut batch, &self.request_id);
                    let new_results = batch.len();
                    self.merge(&mut accumulated, batch);

                    // Notify on every poll, not just when data arrived.
                    let _ = self.progress.try_send(ProgressEvent {
                        request_id: self.request_id.clone(),
                        poll_count,
                        new_results,
                        finished,
                    });

                    if finished {
                        debug!(
                            request_id = %self.request_id,
                            polls = poll_count,
                            results = accumulated.len(),
                            "polling finished"
                        );
                        return PollOutcome::Finished(accumulated);
                    }
                    if new_results == 0 {
                        backoff.record_empty_poll();
                    }
                }
            }

            if !self.wait(&mut backoff).await {
                return self.stopped();
            }
        }
    }

    /// Issues one fetch on the endpoint the merge policy pairs with.
    async fn fetch_once(&self) -> Result<Fetched> {
        match self.settings.merge {
            MergePolicy::Replace => {
                let batch = self.transport.fetch_batch(&self.request_id).await?;
                Ok(Fetched {
                    finished: !batch.is_empty(),
                    batch,
                })
            }
            MergePolicy::Append => {
                let reply = self.transport.fetch_incremental(&self.request_id).await?;
                Ok(Fetched {
                    finished: reply.finished,
                    batch: reply.results,
                })
            }
        }
    }

    fn merge(&self, accumulated: &mut Vec<StatementResult>, batch: Vec<StatementResult>) {
        match self.settings.merge {
            MergePolicy::Replace => {
                if !batch.is_empty() {
                    *accumulated = batch;
                }
            }
            MergePolicy::Append => accumulated.extend(batch),
        }
    }

    /// Sleeps out the backoff delay; returns false if stopped meanwhile.
    async fn wait(&self, backoff: &mut BackoffState) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(backoff.current()) => true,
        }
    }

    fn stopped(&self) -> PollOutcome {
        debug!(request_id = %self.request_id, "polling stopped");
        PollOutcome::Stopped
    }
}
