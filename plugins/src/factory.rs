use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use stepwise_core::api::{
    AppConfig, BatchRunner, NormalizerConfig, PlanNormalizer, RetryConfig, RetryStrategy,
    Scheduler, SchedulerConfig, SchedulerObserver,
};

use crate::conventions::load_conventions;
use crate::executor::{
    exponential_from_config, FixedDelayPlugin, JsonlRendererPlugin, LinearBackoffPlugin,
    TextRendererPlugin,
};
use crate::ignore::load_ignore_rules;

pub fn build_retry_strategy(cfg: &RetryConfig) -> Arc<dyn RetryStrategy> {
    match cfg.strategy.as_str() {
        "linear" => Arc::new(LinearBackoffPlugin::new(cfg)),
        "fixed" => Arc::new(FixedDelayPlugin::new(cfg)),
        "exponential-backoff" | "exponential" => Arc::new(exponential_from_config(cfg)),
        other => {
            tracing::warn!("Unknown retry strategy '{}', using exponential-backoff", other);
            Arc::new(exponential_from_config(cfg))
        }
    }
}

pub fn build_renderer(format: &str, ascii_only: bool) -> Arc<dyn SchedulerObserver> {
    match format {
        "jsonl" => Arc::new(JsonlRendererPlugin::new(false)),
        // Anything other than jsonl behaves like text.
        _ => Arc::new(TextRendererPlugin::new(ascii_only)),
    }
}

/// Normalizer wired with the project's ignore rules and conventions.
///
/// `root` overrides `cfg.root` when given.
pub fn build_normalizer(cfg: &NormalizerConfig, root: Option<&Path>) -> Result<PlanNormalizer> {
    let root = root.unwrap_or_else(|| Path::new(&cfg.root));
    let ignore = load_ignore_rules(root, cfg)?;
    let normalizer = PlanNormalizer::new(Arc::new(ignore));

    Ok(match load_conventions(root, cfg)? {
        Some(set) => normalizer.with_conventions(set),
        None => normalizer,
    })
}

pub fn build_scheduler(
    cfg: &AppConfig,
    max_concurrency: Option<usize>,
    observer: Option<Arc<dyn SchedulerObserver>>,
    cancel: Option<watch::Receiver<bool>>,
) -> Scheduler {
    let mut sched_cfg = SchedulerConfig::from(&cfg.scheduler);
    if let Some(n) = max_concurrency {
        sched_cfg.max_concurrency = n;
    }

    let mut builder =
        Scheduler::builder(sched_cfg).retry_strategy(build_retry_strategy(&cfg.retry));
    if let Some(observer) = observer {
        builder = builder.observer(observer);
    }
    if let Some(cancel) = cancel {
        builder = builder.cancel_signal(cancel);
    }
    builder.build()
}

pub fn build_batch_runner(cfg: &AppConfig, scheduler: Scheduler, size: Option<usize>) -> BatchRunner {
    let mut batch = cfg.batch.clone();
    if let Some(size) = size {
        batch.size = size;
    }
    BatchRunner::from_config(scheduler, &batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_strategy_follows_config() {
        let mut cfg = RetryConfig::default();
        assert_eq!(build_retry_strategy(&cfg).name(), "exponential-backoff");

        cfg.strategy = "linear".into();
        assert_eq!(build_retry_strategy(&cfg).name(), "linear");

        cfg.strategy = "bogus".into();
        assert_eq!(build_retry_strategy(&cfg).name(), "exponential-backoff");
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let cfg = AppConfig::default();
        let scheduler = build_scheduler(&cfg, Some(9), None, None);
        assert_eq!(scheduler.config().max_concurrency, 9);

        let runner = build_batch_runner(&cfg, scheduler.clone(), Some(3));
        assert_eq!(runner.batch_size(), 3);
        assert_eq!(build_batch_runner(&cfg, scheduler, None).batch_size(), 50);
    }

    #[test]
    fn normalizer_picks_up_project_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".stepwiseignore"), "secret/\n").unwrap();

        let normalizer = build_normalizer(&NormalizerConfig::default(), Some(dir.path())).unwrap();
        let plan = normalizer
            .normalize(&serde_json::json!({
                "description": "d",
                "steps": [
                    {"step": 1, "action": "create_file", "description": "s", "path": "secret/key.pem", "content": "k"},
                    {"step": 2, "action": "create_file", "description": "p", "path": "public/index.html", "content": ""}
                ]
            }))
            .unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps[0].path(), Some("public/index.html"));
    }
}
