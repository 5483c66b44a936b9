mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{create_dir, create_file, modify, plan, run_command};
use stepwise_core::api::{
    normalize, plan_to_tasks, NoIgnore, PlanStep, RunSummary, Scheduler, SchedulerConfig,
    StepExecutor, StepOutput,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<usize>>);

#[async_trait]
impl StepExecutor for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn execute(&self, step: &PlanStep) -> anyhow::Result<StepOutput> {
        tokio::task::yield_now().await;
        self.0.lock().unwrap().push(step.step);
        Ok(StepOutput {
            step: step.step,
            summary: format!("{} done", step.action()),
        })
    }
}

#[tokio::test]
async fn normalized_plan_executes_in_a_dependency_safe_order() {
    let raw = plan(vec![
        create_dir(1, "src"),
        create_file(2, "src/main.rs", "fn main() {}"),
        create_file(3, "README.md", "# demo"),
        modify(4, "src/main.rs", "print hello"),
        run_command(5, "cargo build"),
        create_file(6, "NOTES.md", ""),
    ]);
    let canonical = normalize(&raw, &NoIgnore, None).unwrap();
    let recorder = Arc::new(Recorder::default());

    let tasks = plan_to_tasks(&canonical, recorder.clone());
    let results = Scheduler::new(SchedulerConfig::default())
        .run(tasks)
        .await
        .unwrap();

    assert!(RunSummary::from_results(&results).is_success());
    assert_eq!(
        results["step-4"].value.as_ref().map(|o| o.summary.as_str()),
        Some("modify_file done")
    );

    let order = recorder.0.lock().unwrap().clone();
    let pos = |step: usize| order.iter().position(|&s| s == step).unwrap();
    assert_eq!(order.len(), 6);
    assert!(pos(1) < pos(2));
    assert!(pos(2) < pos(4));
    for step in 1..=4 {
        assert!(pos(step) < pos(5));
    }
    assert!(pos(5) < pos(6));
}
