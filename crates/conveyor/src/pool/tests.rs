use super::{ProcessFn, WorkerPool};
use crate::error::ProcessingFault;
use crate::item::{ItemId, WorkItem};
use crate::queue::WorkQueue;
use core::time::Duration;
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;

const GRACE: Duration = Duration::from_secs(5);

fn recording(seen: Arc<Mutex<Vec<u64>>>) -> ProcessFn<u64> {
    Arc::new(move |item: WorkItem<u64>| {
        let seen = Arc::clone(&seen);
        async move {
            seen.lock().push(item.into_payload());
            Ok(())
        }
        .boxed()
    })
}

async fn fill(queue: &WorkQueue<u64>, ids: impl IntoIterator<Item = u64>) {
    for id in ids {
        queue.push(WorkItem::new(ItemId::new(id), id)).await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn drain_processes_every_item_exactly_once() {
    let queue = Arc::new(WorkQueue::new(16));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let pool = WorkerPool::spawn(3, Arc::clone(&queue), recording(Arc::clone(&seen)));

    fill(&queue, 1..=10).await;
    queue.begin_drain();

    let abandoned = pool.join(Instant::now() + GRACE).await;
    assert_eq!(abandoned, 0);

    let mut seen = seen.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn single_worker_preserves_end_to_end_order() {
    let queue = Arc::new(WorkQueue::new(8));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let pool = WorkerPool::spawn(1, Arc::clone(&queue), recording(Arc::clone(&seen)));

    fill(&queue, 1..=5).await;
    queue.begin_drain();

    assert_eq!(pool.join(Instant::now() + GRACE).await, 0);
    assert_eq!(*seen.lock(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test(flavor = "multi_thread")]
async fn faults_and_panics_stay_contained_to_their_item() {
    let queue = Arc::new(WorkQueue::new(16));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let process: ProcessFn<u64> = {
        let seen = Arc::clone(&seen);
        Arc::new(move |item: WorkItem<u64>| {
            let seen = Arc::clone(&seen);
            async move {
                match *item.payload() {
                    3 => Err(ProcessingFault::new("simulated fault")),
                    4 => panic!("simulated panic"),
                    _ => {
                        seen.lock().push(item.into_payload());
                        Ok(())
                    }
                }
            }
            .boxed()
        })
    };

    let pool = WorkerPool::spawn(2, Arc::clone(&queue), process);
    fill(&queue, 1..=6).await;
    queue.begin_drain();

    // Both workers must survive the bad items and drain the rest.
    let abandoned = pool.join(Instant::now() + GRACE).await;
    assert_eq!(abandoned, 0);

    let mut seen = seen.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 5, 6]);
}

#[tokio::test(flavor = "multi_thread")]
async fn join_reports_workers_still_busy_at_deadline() {
    let queue = Arc::new(WorkQueue::new(8));
    let process: ProcessFn<u64> = Arc::new(|_item| {
        async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
        .boxed()
    });

    let pool = WorkerPool::spawn(3, Arc::clone(&queue), process);
    fill(&queue, 1..=3).await;
    queue.begin_drain();

    // Give the workers a moment to pick their items up, then expire.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let abandoned = pool.join(Instant::now() + Duration::from_millis(50)).await;
    assert_eq!(abandoned, 3);
}
