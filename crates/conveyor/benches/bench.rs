use conveyor::{Pipeline, PipelineConfig, WorkItem};
use core::hint::black_box;
use core::time::Duration;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::time::Instant;
use tokio::runtime::Builder;

// Items pushed through the pipeline per benchmark iteration.
const TOTAL_ITEMS: u64 = 4096;

/// Measures submit → queue → worker throughput with a no-op processor, i.e.
/// the coordination overhead of the pipeline itself.
fn bench_pipeline_throughput(c: &mut Criterion) {
    let rt = Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("failed to build runtime");

    for num_workers in [1_usize, 4] {
        let mut group = c.benchmark_group(format!("pipeline/workers/{num_workers}"));
        group.throughput(Throughput::Elements(TOTAL_ITEMS));

        group.bench_function(format!("elems/{TOTAL_ITEMS}"), |b| {
            b.iter_custom(|iters| {
                rt.block_on(async {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let pipeline = Pipeline::new(
                            PipelineConfig {
                                queue_capacity: 256,
                                num_workers,
                                submit_timeout: None,
                            },
                            |item: WorkItem<u64>| async move {
                                black_box(item.into_payload());
                                Ok(())
                            },
                        );

                        for n in 0..TOTAL_ITEMS {
                            pipeline.submit(n).await.expect("open pipeline");
                        }
                        pipeline.request_stop();
                        pipeline
                            .await_terminated(Duration::from_secs(60))
                            .await
                            .expect("drain within deadline");
                    }

                    start.elapsed()
                })
            });
        });

        group.finish();
    }
}

criterion_group!(benches, bench_pipeline_throughput);
criterion_main!(benches);
