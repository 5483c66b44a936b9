//! Per-step validation of untrusted plan records.

use serde_json::{Map, Value};

use crate::error::{PathViolation, PlanError};

use super::path::check_path;
use super::types::{ActionKind, FileSource, PlanStep, StepKind};

/// Validate the structure of the record at `index` (0-based) and build the
/// typed step from it.
pub fn validate_record(index: usize, raw: &Value) -> Result<PlanStep, PlanError> {
    let expected = index + 1;
    let invalid = |reason: String| PlanError::InvalidStep {
        index,
        expected,
        reason,
    };

    let record = raw
        .as_object()
        .ok_or_else(|| invalid("step record must be an object".to_string()))?;

    match record.get("step").and_then(Value::as_f64) {
        None => return Err(invalid("missing numeric 'step' field".to_string())),
        Some(n) if n != expected as f64 => return Err(invalid(format!("found step {n}"))),
        Some(_) => {}
    }

    let action = match record.get("action") {
        Some(Value::String(name)) => ActionKind::parse(name)
            .ok_or_else(|| invalid(format!("unknown action '{name}'")))?,
        _ => return Err(invalid("missing 'action' field".to_string())),
    };

    let description = match record.get("description") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(invalid("missing or empty 'description'".to_string())),
    };

    let kind = validate_fields(expected, action, record)?;
    Ok(PlanStep::new(expected, description, kind))
}

/// Check the kind-specific fields of a record whose structure is already
/// known to be valid. `step` is the 1-based step number used in messages.
pub fn validate_fields(
    step: usize,
    action: ActionKind,
    record: &Map<String, Value>,
) -> Result<StepKind, PlanError> {
    match action {
        ActionKind::CreateDirectory => Ok(StepKind::CreateDirectory {
            path: required_path(step, record)?,
        }),
        ActionKind::CreateFile => {
            let path = required_path(step, record)?;
            let content = optional_string(step, record, "content")?;
            let prompt = optional_string(step, record, "generate_prompt")?;
            let source = match (content, prompt) {
                (Some(_), Some(_)) => {
                    return Err(PlanError::InvalidField {
                        step,
                        field: "content",
                        reason: "cannot be combined with 'generate_prompt'".to_string(),
                    })
                }
                (None, None) => {
                    return Err(PlanError::InvalidField {
                        step,
                        field: "content",
                        reason: "or 'generate_prompt' is required".to_string(),
                    })
                }
                (Some(content), None) => FileSource::Content(content),
                (None, Some(prompt)) if prompt.trim().is_empty() => {
                    return Err(PlanError::InvalidField {
                        step,
                        field: "generate_prompt",
                        reason: "must not be empty".to_string(),
                    })
                }
                (None, Some(prompt)) => FileSource::GeneratePrompt(prompt),
            };
            Ok(StepKind::CreateFile { path, source })
        }
        ActionKind::ModifyFile => {
            let path = required_path(step, record)?;
            let modification_prompt = required_text(step, record, "modification_prompt")?;
            Ok(StepKind::ModifyFile {
                path,
                modification_prompt,
            })
        }
        ActionKind::RunCommand => Ok(StepKind::RunCommand {
            command: required_text(step, record, "command")?,
        }),
    }
}

fn required_path(step: usize, record: &Map<String, Value>) -> Result<String, PlanError> {
    let raw = match record.get("path") {
        Some(Value::String(s)) => s,
        _ => {
            return Err(PlanError::InvalidField {
                step,
                field: "path",
                reason: "is required".to_string(),
            })
        }
    };
    check_path(raw).map_err(|violation| match violation {
        PathViolation::Empty => PlanError::InvalidField {
            step,
            field: "path",
            reason: "must be a non-empty relative path".to_string(),
        },
        violation => PlanError::UnsafePath {
            step,
            path: raw.clone(),
            violation,
        },
    })
}

fn required_text(
    step: usize,
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<String, PlanError> {
    match record.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(PlanError::InvalidField {
            step,
            field,
            reason: "must not be empty".to_string(),
        }),
        _ => Err(PlanError::InvalidField {
            step,
            field,
            reason: "is required".to_string(),
        }),
    }
}

/// `null` counts as absent; any other non-string value is an error.
fn optional_string(
    step: usize,
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, PlanError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PlanError::InvalidField {
            step,
            field,
            reason: "must be a string".to_string(),
        }),
    }
}
