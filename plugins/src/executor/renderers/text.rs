use stepwise_core::api::{SchedulerEvent, SchedulerObserver};

pub struct TextRendererPlugin {
    ascii_only: bool,
}

impl TextRendererPlugin {
    pub fn new(ascii_only: bool) -> Self {
        Self { ascii_only }
    }

    fn format_event(&self, event: &SchedulerEvent) -> String {
        match event {
            SchedulerEvent::RunStart {
                run_id,
                total_tasks,
                max_concurrency,
            } => format!(
                "RUN START {} (tasks: {}, max concurrency: {})",
                run_id, total_tasks, max_concurrency
            ),
            SchedulerEvent::TaskStart {
                run_id,
                task_id,
                attempt,
            } => format!("TASK START {} (task {}, attempt {})", run_id, task_id, attempt),
            SchedulerEvent::TaskRetry {
                run_id,
                task_id,
                retry,
                delay,
                error,
            } => format!(
                "TASK RETRY {} (task {}, retry {}, in {}ms): {}",
                run_id,
                task_id,
                retry,
                delay.as_millis(),
                error
            ),
            SchedulerEvent::TaskComplete {
                run_id,
                task_id,
                succeeded,
                duration_ms,
                retry_count,
                error,
            } => {
                let status = match (*succeeded, self.ascii_only) {
                    (true, true) => "OK",
                    (true, false) => "✓ OK",
                    (false, true) => "FAIL",
                    (false, false) => "✗ FAIL",
                };
                let mut line = format!(
                    "TASK END {} (task {}, status {}, duration {}ms, retries {})",
                    run_id, task_id, status, duration_ms, retry_count
                );
                if let Some(err) = error {
                    line.push_str(": ");
                    line.push_str(err);
                }
                line
            }
            SchedulerEvent::RunEnd { run_id, summary } => format!(
                "RUN END {} (succeeded {}, failed {}, retries {})",
                run_id, summary.succeeded, summary.failed, summary.total_retries
            ),
        }
    }
}

impl SchedulerObserver for TextRendererPlugin {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn on_event(&self, event: &SchedulerEvent) {
        println!("{}", self.format_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_renderer_task_complete() {
        let renderer = TextRendererPlugin::new(true);
        let event = SchedulerEvent::TaskComplete {
            run_id: "run".to_string(),
            task_id: "task".to_string(),
            succeeded: false,
            duration_ms: 5,
            retry_count: 2,
            error: Some("timed out after 5ms".to_string()),
        };

        let line = renderer.format_event(&event);
        assert!(line.contains("TASK END"));
        assert!(line.contains("status FAIL"));
        assert!(line.ends_with(": timed out after 5ms"));
        assert!(line.is_ascii());
    }

    #[test]
    fn test_text_renderer_marks_status_with_symbols() {
        let renderer = TextRendererPlugin::new(false);
        let event = SchedulerEvent::TaskComplete {
            run_id: "run".to_string(),
            task_id: "task".to_string(),
            succeeded: true,
            duration_ms: 1,
            retry_count: 0,
            error: None,
        };

        assert!(renderer.format_event(&event).contains("status ✓ OK"));
    }
}
