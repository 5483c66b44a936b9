use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::traits::{SchedulerEvent, SchedulerObserver};

/// Visual progress monitor for scheduler runs
///
/// Shows an overall bar plus one spinner per running task.
pub struct ProgressMonitor {
    /// Multi-progress container
    multi: MultiProgress,
    /// Overall progress bar
    overall: ProgressBar,
    /// Per-task progress spinners
    task_bars: Mutex<HashMap<String, ProgressBar>>,
    /// Whether monitoring is enabled
    enabled: bool,
}

impl ProgressMonitor {
    /// Create a new progress monitor
    ///
    /// The bar length is taken from each `RunStart` event, so one monitor
    /// can follow several batches.
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                task_bars: Mutex::new(HashMap::new()),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.set_message("Starting...");

        Self {
            multi,
            overall,
            task_bars: Mutex::new(HashMap::new()),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn add_task(&self, task_id: &str, attempt: u32) {
        let Ok(mut bars) = self.task_bars.lock() else {
            return;
        };
        let label = if attempt > 1 {
            format!("⏳ {} (attempt {})", task_id, attempt)
        } else {
            format!("⏳ {}", task_id)
        };
        if let Some(bar) = bars.get(task_id) {
            bar.set_message(label);
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(label);
        bar.enable_steady_tick(Duration::from_millis(100));
        bars.insert(task_id.to_string(), bar);
    }

    fn complete_task(&self, task_id: &str, success: bool, duration_ms: u64) {
        if let Ok(mut bars) = self.task_bars.lock() {
            if let Some(bar) = bars.remove(task_id) {
                let icon = if success { "✅" } else { "❌" };
                bar.finish_with_message(format!("{} {} ({}ms)", icon, task_id, duration_ms));
            }
        }
        self.overall.inc(1);
    }
}

impl SchedulerObserver for ProgressMonitor {
    fn name(&self) -> &str {
        "progress"
    }

    fn on_event(&self, event: &SchedulerEvent) {
        if !self.enabled {
            return;
        }

        match event {
            SchedulerEvent::RunStart { total_tasks, .. } => {
                self.overall.inc_length(*total_tasks as u64);
                self.overall.set_message("Running...");
            }
            SchedulerEvent::TaskStart {
                task_id, attempt, ..
            } => self.add_task(task_id, *attempt),
            SchedulerEvent::TaskRetry { task_id, retry, .. } => {
                self.overall
                    .set_message(format!("Retrying {} ({})", task_id, retry));
            }
            SchedulerEvent::TaskComplete {
                task_id,
                succeeded,
                duration_ms,
                ..
            } => self.complete_task(task_id, *succeeded, *duration_ms),
            SchedulerEvent::RunEnd { summary, .. } => {
                let msg = if summary.is_success() {
                    "✅ All tasks completed".to_string()
                } else {
                    format!("❌ {} of {} tasks failed", summary.failed, summary.total)
                };
                self.overall.set_message(msg);
                if self.overall.position() >= self.overall.length().unwrap_or(0) {
                    self.overall.finish();
                }
            }
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        // Ensure all spinners are cleaned up
        if let Ok(mut bars) = self.task_bars.lock() {
            for (_, bar) in bars.drain() {
                bar.finish_and_clear();
            }
        }
    }
}
