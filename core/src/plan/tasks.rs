use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::scheduler::TaskDescriptor;

use super::path::is_ancestor;
use super::types::{ExecutionPlan, PlanStep, StepKind};

/// Collaborator that actually performs a canonical plan step.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, step: &PlanStep) -> anyhow::Result<StepOutput>;
}

/// What a step execution reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutput {
    pub step: usize,
    pub summary: String,
}

pub fn step_task_id(step: usize) -> String {
    format!("step-{}", step)
}

/// Step numbers that must finish before step `index` may run.
///
/// A `run_command` step waits for everything before it. Any other step waits
/// for the most recent command, the nearest earlier step creating one of its
/// ancestor directories, and the nearest earlier step touching the same path.
pub fn step_dependencies(steps: &[PlanStep], index: usize) -> Vec<usize> {
    let earlier = &steps[..index];

    if matches!(steps[index].kind, StepKind::RunCommand { .. }) {
        return earlier.iter().map(|s| s.step).collect();
    }

    let mut deps = Vec::new();
    if let Some(cmd) = earlier
        .iter()
        .rev()
        .find(|s| matches!(s.kind, StepKind::RunCommand { .. }))
    {
        deps.push(cmd.step);
    }

    if let Some(path) = steps[index].path() {
        let creates_ancestor = earlier.iter().rev().find(|s| match &s.kind {
            StepKind::CreateDirectory { path: dir } => is_ancestor(dir, path),
            _ => false,
        });
        let same_path = earlier.iter().rev().find(|s| s.path() == Some(path));

        for dep in [creates_ancestor, same_path].into_iter().flatten() {
            if !deps.contains(&dep.step) {
                deps.push(dep.step);
            }
        }
    }

    deps.sort_unstable();
    deps
}

/// Turn a canonical plan into scheduler tasks that run each step through
/// `executor`.
///
/// Earlier steps get higher priority so independent steps start in plan
/// order.
pub fn plan_to_tasks(
    plan: &ExecutionPlan,
    executor: Arc<dyn StepExecutor>,
) -> Vec<TaskDescriptor<StepOutput>> {
    let total = plan.steps.len();

    plan.steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let executor = Arc::clone(&executor);
            let owned = Arc::new(step.clone());
            TaskDescriptor::new(step_task_id(step.step), move || {
                let executor = Arc::clone(&executor);
                let step = Arc::clone(&owned);
                async move { executor.execute(&step).await }
            })
            .priority((total - index) as i64)
            .depends_on(
                step_dependencies(&plan.steps, index)
                    .into_iter()
                    .map(step_task_id),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::FileSource;

    fn dir(step: usize, path: &str) -> PlanStep {
        PlanStep::new(step, "d", StepKind::CreateDirectory { path: path.into() })
    }

    fn file(step: usize, path: &str) -> PlanStep {
        PlanStep::new(
            step,
            "f",
            StepKind::CreateFile {
                path: path.into(),
                source: FileSource::Content(String::new()),
            },
        )
    }

    fn modify(step: usize, path: &str) -> PlanStep {
        PlanStep::new(
            step,
            "m",
            StepKind::ModifyFile {
                path: path.into(),
                modification_prompt: "p".into(),
            },
        )
    }

    fn command(step: usize) -> PlanStep {
        PlanStep::new(step, "c", StepKind::RunCommand { command: "make".into() })
    }

    #[test]
    fn files_wait_for_their_directories_and_previous_edits() {
        let steps = vec![
            dir(1, "src"),
            dir(2, "docs"),
            file(3, "src/lib.rs"),
            modify(4, "src/lib.rs"),
            file(5, "README.md"),
        ];
        assert_eq!(step_dependencies(&steps, 0), Vec::<usize>::new());
        assert_eq!(step_dependencies(&steps, 2), vec![1]);
        assert_eq!(step_dependencies(&steps, 3), vec![1, 3]);
        assert_eq!(step_dependencies(&steps, 4), Vec::<usize>::new());
    }

    #[test]
    fn commands_are_barriers() {
        let steps = vec![dir(1, "a"), file(2, "b.txt"), command(3), file(4, "c.txt")];
        assert_eq!(step_dependencies(&steps, 2), vec![1, 2]);
        assert_eq!(step_dependencies(&steps, 3), vec![3]);
    }

    #[test]
    fn nested_directories_use_nearest_creator() {
        let steps = vec![dir(1, "a"), dir(2, "a/b"), file(3, "a/b/c.txt")];
        assert_eq!(step_dependencies(&steps, 1), vec![1]);
        assert_eq!(step_dependencies(&steps, 2), vec![2]);
    }

    struct Echo;

    #[async_trait]
    impl StepExecutor for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(&self, step: &PlanStep) -> anyhow::Result<StepOutput> {
            Ok(StepOutput {
                step: step.step,
                summary: step.description.clone(),
            })
        }
    }

    #[test]
    fn tasks_carry_ids_priorities_and_dependencies() {
        let plan = ExecutionPlan {
            description: "x".into(),
            steps: vec![dir(1, "src"), file(2, "src/main.rs"), command(3)],
        };
        let tasks = plan_to_tasks(&plan, Arc::new(Echo));

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["step-1", "step-2", "step-3"]);
        assert_eq!(
            tasks.iter().map(|t| t.priority).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
        assert_eq!(tasks[1].dependencies, vec!["step-1".to_string()]);
        assert_eq!(
            tasks[2].dependencies,
            vec!["step-1".to_string(), "step-2".to_string()]
        );
    }
}
