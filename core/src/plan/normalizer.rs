//! Plan normalization: untrusted records in, canonical plan out.
//!
//! Pipeline per record: structural validation, kind-specific field
//! validation, ignore filtering, convention checks. Survivors are then
//! consolidated and renumbered. Any validation or convention failure aborts
//! the whole normalization; ignore matches only drop the one step.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::PlanError;

use super::convention::ConventionSet;
use super::extract::extract_plan_json;
use super::ignore::{is_step_ignored, IgnoreFilter, NoIgnore};
use super::types::{ExecutionPlan, PlanStep, StepKind};
use super::validator::validate_record;

/// Separator placed between merged modification prompts.
pub const MODIFICATION_DELIMITER: &str = "\n\n---\n\n";

/// Reusable normalizer bound to one ignore filter and optional conventions.
#[derive(Clone)]
pub struct PlanNormalizer {
    ignore: Arc<dyn IgnoreFilter>,
    conventions: Option<ConventionSet>,
}

impl Default for PlanNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(NoIgnore))
    }
}

impl PlanNormalizer {
    pub fn new(ignore: Arc<dyn IgnoreFilter>) -> Self {
        Self {
            ignore,
            conventions: None,
        }
    }

    pub fn with_conventions(mut self, conventions: ConventionSet) -> Self {
        self.conventions = Some(conventions);
        self
    }

    pub fn conventions(&self) -> Option<&ConventionSet> {
        self.conventions.as_ref()
    }

    pub fn normalize(&self, raw: &Value) -> Result<ExecutionPlan, PlanError> {
        normalize(raw, self.ignore.as_ref(), self.conventions.as_ref())
    }

    /// Normalize generator output, locating the JSON object first.
    pub fn normalize_str(&self, text: &str) -> Result<ExecutionPlan, PlanError> {
        let raw = extract_plan_json(text)?;
        self.normalize(&raw)
    }
}

/// Normalize a raw plan object into a canonical [`ExecutionPlan`].
pub fn normalize(
    raw: &Value,
    ignore: &dyn IgnoreFilter,
    conventions: Option<&ConventionSet>,
) -> Result<ExecutionPlan, PlanError> {
    let plan = raw
        .as_object()
        .ok_or(PlanError::MissingField { field: "description" })?;
    let description = plan
        .get("description")
        .and_then(Value::as_str)
        .ok_or(PlanError::MissingField { field: "description" })?;
    let records = plan
        .get("steps")
        .and_then(Value::as_array)
        .ok_or(PlanError::MissingField { field: "steps" })?;

    // Every record is checked before any step is filtered or matched
    // against conventions.
    let validated = records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_record(index, record))
        .collect::<Result<Vec<_>, _>>()?;

    let survivors: Vec<PlanStep> = validated
        .into_iter()
        .filter(|step| match step.path() {
            Some(path) if is_step_ignored(ignore, path, step.kind.is_directory()) => {
                tracing::debug!(
                    "Skipping step {} ({}): path '{}' is ignored",
                    step.step,
                    step.action(),
                    path
                );
                false
            }
            _ => true,
        })
        .collect();

    if let Some(set) = conventions {
        for step in &survivors {
            let Some(path) = step.path() else {
                continue;
            };
            if let Some(rule) = set.violation(path, step.kind.is_directory()) {
                return Err(PlanError::ConventionViolation {
                    step: step.step,
                    path: path.to_string(),
                    rule: rule.name.clone(),
                });
            }
        }
    }

    let mut steps = consolidate(survivors);
    renumber(&mut steps);

    Ok(ExecutionPlan {
        description: description.to_string(),
        steps,
    })
}

/// Merge every `modify_file` step into the first one targeting the same path.
///
/// The first occurrence keeps its position; later prompts are appended in
/// order and their slots are dropped. Other steps pass through unchanged.
pub fn consolidate(steps: Vec<PlanStep>) -> Vec<PlanStep> {
    let mut canonical: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<PlanStep> = Vec::with_capacity(steps.len());

    for step in steps {
        let StepKind::ModifyFile {
            path,
            modification_prompt,
        } = &step.kind
        else {
            out.push(step);
            continue;
        };

        match canonical.get(path) {
            Some(&slot) => {
                tracing::debug!(
                    "Merging step {} into step {} for '{}'",
                    step.step,
                    out[slot].step,
                    path
                );
                if let StepKind::ModifyFile {
                    modification_prompt: merged,
                    ..
                } = &mut out[slot].kind
                {
                    merged.push_str(MODIFICATION_DELIMITER);
                    merged.push_str(modification_prompt);
                }
            }
            None => {
                canonical.insert(path.clone(), out.len());
                out.push(step);
            }
        }
    }

    out
}

/// Assign sequence numbers 1..N in current order.
pub fn renumber(steps: &mut [PlanStep]) {
    for (i, step) in steps.iter_mut().enumerate() {
        step.step = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ignore::IgnoreRules;
    use serde_json::json;

    #[test]
    fn top_level_shape_errors_name_the_field() {
        let no_ignore = NoIgnore;
        assert_eq!(
            normalize(&json!([]), &no_ignore, None),
            Err(PlanError::MissingField { field: "description" })
        );
        assert_eq!(
            normalize(&json!({"steps": []}), &no_ignore, None),
            Err(PlanError::MissingField { field: "description" })
        );
        assert_eq!(
            normalize(&json!({"description": "x", "steps": {}}), &no_ignore, None),
            Err(PlanError::MissingField { field: "steps" })
        );
    }

    #[test]
    fn merges_modify_steps_into_first_slot() {
        let raw = json!({
            "description": "x",
            "steps": [
                {"step": 1, "action": "modify_file", "description": "a1", "path": "a.ts", "modification_prompt": "add X"},
                {"step": 2, "action": "run_command", "description": "c", "command": "npm test"},
                {"step": 3, "action": "modify_file", "description": "a2", "path": "./a.ts", "modification_prompt": "add Y"}
            ]
        });

        let plan = normalize(&raw, &NoIgnore, None).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].step, 1);
        assert_eq!(plan.steps[0].description, "a1");
        assert_eq!(
            plan.steps[0].kind,
            StepKind::ModifyFile {
                path: "a.ts".into(),
                modification_prompt: "add X\n\n---\n\nadd Y".into(),
            }
        );
        assert_eq!(plan.steps[1].step, 2);
    }

    #[test]
    fn ignored_steps_are_dropped_and_rest_renumbered() {
        let ignore = IgnoreRules::from_lines(["dist/", "*.log"]);
        let raw = json!({
            "description": "x",
            "steps": [
                {"step": 1, "action": "create_directory", "description": "d", "path": "dist"},
                {"step": 2, "action": "create_file", "description": "f", "path": "src/main.ts", "content": ""},
                {"step": 3, "action": "create_file", "description": "l", "path": "debug.log", "content": ""}
            ]
        });

        let plan = normalize(&raw, &ignore, None).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].step, 1);
        assert_eq!(plan.steps[0].path(), Some("src/main.ts"));
    }

    #[test]
    fn validation_runs_before_ignore_filtering() {
        let ignore_everything = |_: &str| true;
        let raw = json!({
            "description": "x",
            "steps": [
                {"step": 1, "action": "create_file", "description": "f", "path": "/etc/hosts", "content": ""}
            ]
        });
        let err = normalize(&raw, &ignore_everything, None).unwrap_err();
        assert!(matches!(err, PlanError::UnsafePath { .. }));
    }

    #[test]
    fn empty_step_list_is_a_valid_plan() {
        let plan = normalize(&json!({"description": "", "steps": []}), &NoIgnore, None).unwrap();
        assert!(plan.is_empty());
    }
}
