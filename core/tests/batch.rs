mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{config, sleeper, ConcurrencyProbe, Journal};
use stepwise_core::api::{BatchRunner, Scheduler, TaskDescriptor, TaskFailure};

#[tokio::test(start_paused = true)]
async fn chunks_run_sequentially_and_results_merge() {
    let probe = Arc::new(ConcurrencyProbe::default());
    let journal = Journal::default();
    let tasks: Vec<_> = (0..7)
        .map(|i| sleeper(&format!("t{i}"), 10, &probe, &journal))
        .collect();

    let runner = BatchRunner::new(Scheduler::new(config(2)), 3);
    let results = runner.run(tasks).await.unwrap();

    assert_eq!(results.len(), 7);
    assert!(results.values().all(|r| r.succeeded));
    assert!(probe.peak() <= 2);

    // Every task of the first chunk ends before the second chunk starts
    let last_end_first = ["t0", "t1", "t2"]
        .iter()
        .map(|id| journal.position(&format!("{id}:end")))
        .max()
        .unwrap();
    let first_start_second = ["t3", "t4", "t5"]
        .iter()
        .map(|id| journal.position(&format!("{id}:start")))
        .min()
        .unwrap();
    assert!(last_end_first < first_start_second);
}

#[tokio::test(start_paused = true)]
async fn pauses_between_chunks_but_not_after_the_last() {
    let tasks: Vec<_> = (0..5)
        .map(|i| TaskDescriptor::new(format!("t{i}"), || async { Ok(()) }))
        .collect();
    let runner =
        BatchRunner::new(Scheduler::new(config(4)), 2).with_pause(Duration::from_millis(500));

    let started = tokio::time::Instant::now();
    runner.run(tasks).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn dependencies_do_not_carry_across_chunks() {
    let tasks = vec![
        TaskDescriptor::new("a", || async { Ok(()) }),
        TaskDescriptor::new("b", || async { Ok(()) }).depends_on(["a"]),
    ];
    let runner = BatchRunner::new(Scheduler::new(config(2)), 1);

    let results = runner.run(tasks).await.unwrap();

    assert!(results["a"].succeeded);
    assert_eq!(
        results["b"].failure,
        Some(TaskFailure::UnknownDependency {
            dependency: "a".into()
        })
    );
}
