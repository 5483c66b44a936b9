use chrono::Local;
use serde_json::{json, Value};
use stepwise_core::api::{SchedulerEvent, SchedulerObserver};

pub struct JsonlRendererPlugin {
    pretty_print: bool,
}

impl JsonlRendererPlugin {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    fn event_to_json(&self, event: &SchedulerEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        let mut value = match event {
            SchedulerEvent::RunStart {
                total_tasks,
                max_concurrency,
                ..
            } => json!({
                "metadata": {
                    "total_tasks": total_tasks,
                    "max_concurrency": max_concurrency,
                }
            }),
            SchedulerEvent::TaskStart {
                task_id, attempt, ..
            } => json!({
                "task_id": task_id,
                "metadata": {
                    "attempt": attempt,
                }
            }),
            SchedulerEvent::TaskRetry {
                task_id,
                retry,
                delay,
                error,
                ..
            } => json!({
                "task_id": task_id,
                "metadata": {
                    "retry": retry,
                    "delay_ms": delay.as_millis() as u64,
                    "error": error,
                }
            }),
            SchedulerEvent::TaskComplete {
                task_id,
                succeeded,
                duration_ms,
                retry_count,
                error,
                ..
            } => json!({
                "task_id": task_id,
                "metadata": {
                    "success": succeeded,
                    "duration_ms": duration_ms,
                    "retry_count": retry_count,
                    "error": error,
                }
            }),
            SchedulerEvent::RunEnd { summary, .. } => json!({
                "metadata": {
                    "total_tasks": summary.total,
                    "succeeded": summary.succeeded,
                    "failed": summary.failed,
                    "total_retries": summary.total_retries,
                    "outcome": summary.outcome,
                }
            }),
        };

        if let Some(obj) = value.as_object_mut() {
            obj.insert("v".into(), json!(1));
            obj.insert("event_type".into(), json!(event.event_type()));
            obj.insert("ts".into(), json!(ts));
            obj.insert("run_id".into(), json!(event.run_id()));
        }
        value
    }
}

impl SchedulerObserver for JsonlRendererPlugin {
    fn name(&self) -> &str {
        "jsonl-renderer"
    }

    fn on_event(&self, event: &SchedulerEvent) {
        let value = self.event_to_json(event);
        if self.pretty_print {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".into()));
        } else {
            println!("{}", serde_json::to_string(&value).unwrap_or_else(|_| "{}".into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use stepwise_core::api::{RunSummary, TaskResult};

    #[test]
    fn test_jsonl_renderer_event_type() {
        let renderer = JsonlRendererPlugin::new(false);
        let event = SchedulerEvent::RunStart {
            run_id: "run".to_string(),
            total_tasks: 2,
            max_concurrency: 4,
        };

        let value = renderer.event_to_json(&event);
        assert_eq!(value["v"], 1);
        assert_eq!(value["event_type"], "run.start");
        assert_eq!(value["run_id"], "run");
        assert_eq!(value["metadata"]["total_tasks"], 2);
    }

    #[test]
    fn test_jsonl_renderer_task_retry() {
        let renderer = JsonlRendererPlugin::new(false);
        let event = SchedulerEvent::TaskRetry {
            run_id: "run".to_string(),
            task_id: "task".to_string(),
            retry: 2,
            delay: Duration::from_millis(2000),
            error: "boom".to_string(),
        };

        let value = renderer.event_to_json(&event);
        assert_eq!(value["event_type"], "task.retry");
        assert_eq!(value["task_id"], "task");
        assert_eq!(value["metadata"]["delay_ms"], 2000);
    }

    #[test]
    fn test_jsonl_renderer_run_end() {
        let renderer = JsonlRendererPlugin::new(false);
        let mut results = HashMap::new();
        results.insert("a".to_string(), TaskResult::success("a", (), 3, 0));
        let event = SchedulerEvent::RunEnd {
            run_id: "run".to_string(),
            summary: RunSummary::from_results(&results),
        };

        let value = renderer.event_to_json(&event);
        assert_eq!(value["metadata"]["total_tasks"], 1);
        assert_eq!(value["metadata"]["outcome"], "all_succeeded");
    }
}
