//! Locate the plan object inside raw generator output.

use serde_json::Value;

use crate::error::PlanError;

/// Parse a plan from text that may wrap the JSON in a fenced code block or
/// surrounding prose.
pub fn extract_plan_json(text: &str) -> Result<Value, PlanError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PlanError::Parse("input is empty".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(block) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(block.trim()) {
            return Ok(value);
        }
    }

    let candidate = first_object(trimmed)
        .ok_or_else(|| PlanError::Parse("no JSON object found in input".to_string()))?;
    serde_json::from_str::<Value>(candidate).map_err(|e| PlanError::Parse(e.to_string()))
}

/// Body of the first ``` fenced block, skipping an optional language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// First balanced `{...}` span, honouring string literals and escapes.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_json() {
        let v = extract_plan_json(r#" {"description": "x", "steps": []} "#).unwrap();
        assert_eq!(v, json!({"description": "x", "steps": []}));
    }

    #[test]
    fn accepts_fenced_json() {
        let text = "Here is the plan:\n```json\n{\"description\": \"x\", \"steps\": []}\n```\nDone.";
        let v = extract_plan_json(text).unwrap();
        assert_eq!(v["description"], "x");
    }

    #[test]
    fn accepts_object_in_prose_with_braces_in_strings() {
        let text = r#"Sure! {"description": "use {braces}", "steps": [{"step": 1}]} hope that helps"#;
        let v = extract_plan_json(text).unwrap();
        assert_eq!(v["description"], "use {braces}");
        assert_eq!(v["steps"][0]["step"], 1);
    }

    #[test]
    fn rejects_text_without_json() {
        assert!(matches!(extract_plan_json("no plan here"), Err(PlanError::Parse(_))));
        assert!(matches!(extract_plan_json("   "), Err(PlanError::Parse(_))));
        assert!(matches!(extract_plan_json("{ unterminated"), Err(PlanError::Parse(_))));
    }
}
