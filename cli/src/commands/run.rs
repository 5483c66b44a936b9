use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use stepwise_core::api::{
    plan_to_tasks, AppConfig, CliError, ErrorCode, ObserverChain, ProgressMonitor, RunSummary,
    SchedulerObserver, StepOutput, TaskResult,
};
use stepwise_plugins::executor::DryRunExecutor;
use stepwise_plugins::factory::{build_batch_runner, build_renderer, build_scheduler};

use super::cli::{OutputFormat, RunArgs};
use super::normalize::load_plan;

pub async fn handle_run(args: RunArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let plan = load_plan(cfg, &args.plan)?;
    let executor = DryRunExecutor::new().with_delay(Duration::from_millis(args.step_delay_ms));
    let tasks = plan_to_tasks(&plan, Arc::new(executor));

    let mut observers = ObserverChain::new();
    observers.push(build_renderer(args.format.as_str(), args.ascii));
    if args.progress {
        observers.push(Arc::new(ProgressMonitor::new(true)));
    }
    let observer: Arc<dyn SchedulerObserver> = Arc::new(observers);

    let scheduler = build_scheduler(
        cfg,
        args.max_concurrency,
        Some(observer),
        Some(cancel_on_ctrl_c()),
    );

    let results = match args.batch_size {
        Some(size) => {
            build_batch_runner(cfg, scheduler, Some(size))
                .run(tasks)
                .await?
        }
        None => scheduler.run(tasks).await?,
    };

    let summary = RunSummary::from_results(&results);
    print_summary(&summary, &results, args.format)?;

    Ok(if summary.is_success() {
        ErrorCode::Success.as_u16() as i32
    } else {
        ErrorCode::GeneralError.as_u16() as i32
    })
}

fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling pending steps");
            let _ = tx.send(true);
        }
    });
    rx
}

fn print_summary(
    summary: &RunSummary,
    results: &HashMap<String, TaskResult<StepOutput>>,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Jsonl => {
            let line = serde_json::to_string(summary)
                .map_err(|e| CliError::Command(format!("serialize summary failed: {e}")))?;
            println!("{line}");
        }
        OutputFormat::Text => {
            for line in summary_lines(summary, results) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Human-readable run report, one line per failed step after the totals.
pub fn summary_lines(
    summary: &RunSummary,
    results: &HashMap<String, TaskResult<StepOutput>>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} steps: {} succeeded, {} failed, {} retries",
        summary.total, summary.succeeded, summary.failed, summary.total_retries
    )];
    for id in &summary.failed_ids {
        let reason = results
            .get(id)
            .and_then(|r| r.error_message.as_deref())
            .unwrap_or("unknown error");
        lines.push(format!("  {}: {}", id, reason));
    }
    lines
}
