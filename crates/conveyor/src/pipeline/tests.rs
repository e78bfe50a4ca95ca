use super::{Pipeline, PipelineConfig};
use crate::coordinator::ShutdownPhase;
use crate::error::Error;
use crate::item::WorkItem;
use crate::queue::QueueState;
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::timeout;

const GRACE: Duration = Duration::from_secs(5);

fn config(queue_capacity: usize, num_workers: usize) -> PipelineConfig {
    PipelineConfig {
        queue_capacity,
        num_workers,
        submit_timeout: None,
    }
}

/// A pipeline whose processor records each payload it completes.
fn recording(config: PipelineConfig) -> (Pipeline<u64>, Arc<Mutex<Vec<u64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let pipeline = Pipeline::new(config, move |item: WorkItem<u64>| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().push(item.into_payload());
            Ok(())
        }
    });
    (pipeline, seen)
}

#[tokio::test]
async fn submit_assigns_fresh_ids() {
    let (pipeline, _seen) = recording(config(8, 1));

    let a = pipeline.submit(10).await.unwrap();
    let b = pipeline.submit(20).await.unwrap();
    let c = pipeline.submit(30).await.unwrap();

    assert!(a < b && b < c, "ids must be unique and ascending");

    pipeline.request_stop();
    pipeline.await_terminated(GRACE).await.unwrap();
}

#[tokio::test]
async fn submissions_rejected_promptly_after_stop() {
    let (pipeline, _seen) = recording(config(8, 2));
    pipeline.request_stop();

    let denied = timeout(Duration::from_millis(500), pipeline.submit(1))
        .await
        .expect("rejection must be prompt, not a hang");
    assert_eq!(denied, Err(Error::QueueClosed));

    pipeline.await_terminated(GRACE).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn request_stop_is_idempotent() {
    let (pipeline, seen) = recording(config(8, 2));
    for n in 1..=4 {
        pipeline.submit(n).await.unwrap();
    }

    pipeline.request_stop();
    pipeline.request_stop();
    pipeline.await_terminated(GRACE).await.unwrap();

    let mut seen = seen.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4], "double stop must not drop or duplicate work");
}

#[tokio::test]
async fn phases_progress_forward() {
    let (pipeline, _seen) = recording(config(4, 1));
    assert_eq!(pipeline.phase(), ShutdownPhase::Active);
    assert_eq!(pipeline.queue_state(), QueueState::Open);

    pipeline.request_stop();
    assert_eq!(pipeline.phase(), ShutdownPhase::Draining);

    pipeline.await_terminated(GRACE).await.unwrap();
    assert_eq!(pipeline.phase(), ShutdownPhase::Terminated);
    assert_eq!(pipeline.queue_state(), QueueState::Closed);
}

#[tokio::test(flavor = "multi_thread")]
async fn saturated_queue_rejects_after_submit_timeout() {
    let pipeline = Pipeline::new(
        PipelineConfig {
            queue_capacity: 1,
            num_workers: 1,
            submit_timeout: Some(Duration::from_millis(100)),
        },
        |_item: WorkItem<u64>| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        },
    );

    // First item goes straight to the (slow) worker; give it time to leave
    // the buffer so the second occupies the only slot.
    pipeline.submit(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    pipeline.submit(2).await.unwrap();

    let rejected = pipeline.submit(3).await;
    assert_eq!(
        rejected,
        Err(Error::Rejected {
            waited: Duration::from_millis(100)
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn grace_deadline_reports_partial_shutdown() {
    let pipeline = Pipeline::new(config(4, 2), |_item: WorkItem<u64>| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    });

    pipeline.submit(1).await.unwrap();
    pipeline.submit(2).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    pipeline.request_stop();
    let outcome = pipeline.await_terminated(Duration::from_millis(100)).await;
    assert_eq!(outcome, Err(Error::PartialShutdown { abandoned: 2 }));
    assert_eq!(pipeline.phase(), ShutdownPhase::Terminated);

    // The recorded outcome is stable across repeated calls.
    let again = pipeline.await_terminated(Duration::from_millis(1)).await;
    assert_eq!(again, Err(Error::PartialShutdown { abandoned: 2 }));
}
