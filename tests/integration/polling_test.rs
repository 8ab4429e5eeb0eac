//! Polling behavior tests: merge order, backoff shape, progress delivery.

use std::sync::Arc;
use std::time::Duration;

use courier::poll::{BackoffPolicy, MergePolicy, PollOutcome, PollerSettings, PollingTask};
use courier::remote::{IncrementalReply, MockTransport};
use courier::results::{StatementResult, StatementStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn fast_settings(merge: MergePolicy) -> PollerSettings {
    PollerSettings {
        backoff: BackoffPolicy::Fixed(Duration::from_millis(1)),
        merge,
        max_failures: 3,
    }
}

fn spawn_task(
    transport: Arc<MockTransport>,
    settings: PollerSettings,
) -> (
    tokio::task::JoinHandle<PollOutcome>,
    CancellationToken,
    mpsc::Receiver<courier::poll::ProgressEvent>,
) {
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(64);
    let task = PollingTask::new("r1", "s1", settings, transport, cancel.clone(), tx);
    (tokio::spawn(task.run()), cancel, rx)
}

fn batch(ids: &[&str]) -> Vec<StatementResult> {
    ids.iter()
        .map(|id| StatementResult::new(*id, StatementStatus::Success))
        .collect()
}

#[tokio::test]
async fn accumulate_merge_preserves_relative_order_across_batches() {
    let transport = Arc::new(MockTransport::new());
    transport.push_incremental(IncrementalReply {
        finished: false,
        results: batch(&["q1", "q2", "q3"]),
        ..Default::default()
    });
    transport.push_incremental(IncrementalReply {
        finished: true,
        results: batch(&["q4", "q5"]),
        ..Default::default()
    });

    let (handle, _cancel, _rx) = spawn_task(transport, fast_settings(MergePolicy::Append));
    match handle.await.unwrap() {
        PollOutcome::Finished(results) => {
            // m + n results, relative order preserved.
            let ids: Vec<&str> = results.iter().map(|r| r.sql_id.as_str()).collect();
            assert_eq!(ids, ["q1", "q2", "q3", "q4", "q5"]);
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

#[tokio::test]
async fn replace_merge_takes_the_final_batch_whole() {
    let transport = Arc::new(MockTransport::new());
    transport.push_batch(vec![]);
    transport.push_batch(batch(&["q1", "q2"]));

    let settings = PollerSettings {
        backoff: BackoffPolicy::Growing {
            base: Duration::from_millis(1),
            increment: Duration::from_millis(1),
            ceiling: Duration::from_millis(5),
        },
        merge: MergePolicy::Replace,
        max_failures: 3,
    };
    let (handle, _cancel, _rx) = spawn_task(transport.clone(), settings);
    match handle.await.unwrap() {
        PollOutcome::Finished(results) => assert_eq!(results.len(), 2),
        other => panic!("expected Finished, got {other:?}"),
    }
    assert_eq!(transport.fetch_calls(), 2);
}

#[test]
fn growing_backoff_interval_sequence_is_non_decreasing_and_bounded() {
    let policy = BackoffPolicy::Growing {
        base: Duration::from_millis(200),
        increment: Duration::from_millis(200),
        ceiling: Duration::from_millis(3000),
    };
    let mut state = policy.state();
    let mut intervals = Vec::new();
    for _ in 0..20 {
        intervals.push(state.current());
        state.record_empty_poll();
    }

    for pair in intervals.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(intervals.iter().all(|&i| i <= Duration::from_millis(3000)));
    assert_eq!(*intervals.last().unwrap(), Duration::from_millis(3000));
}

#[tokio::test]
async fn progress_is_reported_on_every_poll_even_without_data() {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..3 {
        transport.push_incremental(IncrementalReply::default());
    }
    transport.push_incremental(IncrementalReply {
        finished: true,
        results: batch(&["q1"]),
        ..Default::default()
    });

    let (handle, _cancel, mut rx) = spawn_task(transport, fast_settings(MergePolicy::Append));
    handle.await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 4);
    assert!(events[..3].iter().all(|e| e.new_results == 0 && !e.finished));
    assert!(events[3].finished);
    let counts: Vec<u64> = events.iter().map(|e| e.poll_count).collect();
    assert_eq!(counts, [1, 2, 3, 4]);
}

#[tokio::test]
async fn stop_mid_flight_resolves_with_stopped() {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..100 {
        transport.push_incremental(IncrementalReply::default());
    }
    let settings = PollerSettings {
        backoff: BackoffPolicy::Fixed(Duration::from_millis(10)),
        merge: MergePolicy::Append,
        max_failures: 3,
    };
    let (handle, cancel, _rx) = spawn_task(transport, settings);

    tokio::time::sleep(Duration::from_millis(25)).await;
    cancel.cancel();
    assert_eq!(handle.await.unwrap(), PollOutcome::Stopped);
}
