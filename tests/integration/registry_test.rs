//! Task registry tests with live polling tasks.

use std::sync::Arc;
use std::time::Duration;

use courier::poll::{BackoffPolicy, MergePolicy, PollOutcome, PollerSettings, PollingTask};
use courier::registry::TaskRegistry;
use courier::remote::{IncrementalReply, MockTransport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn endless_transport() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..1000 {
        transport.push_incremental(IncrementalReply::default());
    }
    transport
}

fn start_task(
    registry: &Arc<TaskRegistry>,
    transport: &Arc<MockTransport>,
    request_id: &str,
    session_id: &str,
) -> tokio::task::JoinHandle<PollOutcome> {
    let cancel = CancellationToken::new();
    let (tx, _rx) = mpsc::channel(8);
    let settings = PollerSettings {
        backoff: BackoffPolicy::Fixed(Duration::from_millis(5)),
        merge: MergePolicy::Append,
        max_failures: 3,
    };
    let task = PollingTask::new(
        request_id,
        session_id,
        settings,
        Arc::clone(transport) as Arc<dyn courier::remote::SessionTransport>,
        cancel.clone(),
        tx,
    );
    registry.register(request_id, session_id, cancel);

    let registry = Arc::clone(registry);
    let owned_id = request_id.to_string();
    tokio::spawn(async move {
        let outcome = task.run().await;
        registry.unregister(&owned_id);
        outcome
    })
}

#[tokio::test]
async fn stop_by_session_stops_only_that_sessions_tasks() {
    let registry = Arc::new(TaskRegistry::new());
    let transport = endless_transport();

    let a = start_task(&registry, &transport, "r1", "s1");
    let b = start_task(&registry, &transport, "r2", "s2");
    let c = start_task(&registry, &transport, "r3", "s1");
    assert_eq!(registry.len(), 3);

    assert_eq!(registry.stop_by_session("s1"), 2);
    assert_eq!(a.await.unwrap(), PollOutcome::Stopped);
    assert_eq!(c.await.unwrap(), PollOutcome::Stopped);

    // The other session's task is still registered and pollable.
    assert!(registry.contains("r2"));

    registry.stop_all();
    assert_eq!(b.await.unwrap(), PollOutcome::Stopped);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn completed_task_unregisters_itself_exactly_once() {
    let registry = Arc::new(TaskRegistry::new());
    let transport = Arc::new(MockTransport::new()); // finishes on first poll

    let handle = start_task(&registry, &transport, "r1", "s1");
    assert!(matches!(handle.await.unwrap(), PollOutcome::Finished(_)));
    assert!(!registry.contains("r1"));

    // Stopping after removal is a no-op.
    assert!(!registry.stop("r1"));
    assert!(!registry.unregister("r1"));
}

#[tokio::test]
async fn stop_before_first_fetch_resolves_without_result() {
    let registry = Arc::new(TaskRegistry::new());
    let transport = endless_transport();

    let handle = start_task(&registry, &transport, "r1", "s1");
    // Under the current-thread runtime the task has not run yet.
    assert!(registry.stop("r1"));
    assert_eq!(transport.fetch_calls(), 0);

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, PollOutcome::Stopped);
    assert!(outcome.into_results().is_none());
    assert!(registry.is_empty());
}
