use std::time::Duration;

use async_trait::async_trait;
use stepwise_core::api::{FileSource, PlanStep, StepExecutor, StepKind, StepOutput};

/// Describes each step instead of performing it.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor {
    /// Simulated work time per step
    delay: Duration,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn describe(step: &PlanStep) -> String {
        match &step.kind {
            StepKind::CreateDirectory { path } => format!("would create directory {}", path),
            StepKind::CreateFile {
                path,
                source: FileSource::Content(content),
            } => format!("would write {} bytes to {}", content.len(), path),
            StepKind::CreateFile {
                path,
                source: FileSource::GeneratePrompt(_),
            } => format!("would generate {} from a prompt", path),
            StepKind::ModifyFile {
                path,
                modification_prompt,
            } => {
                let edits = modification_prompt
                    .matches(stepwise_core::api::MODIFICATION_DELIMITER)
                    .count()
                    + 1;
                format!("would apply {} modification(s) to {}", edits, path)
            }
            StepKind::RunCommand { command } => format!("would run `{}`", command),
        }
    }
}

#[async_trait]
impl StepExecutor for DryRunExecutor {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn execute(&self, step: &PlanStep) -> anyhow::Result<StepOutput> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let summary = Self::describe(step);
        tracing::debug!("step {}: {}", step.step, summary);
        Ok(StepOutput {
            step: step.step,
            summary,
        })
    }
}
