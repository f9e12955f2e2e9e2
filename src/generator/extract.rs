//! Pulling structured data out of free-form completions

use serde_json::Value;

use super::error::{GenerationError, GenerationResult};

/// Return the first balanced `{...}` substring of `text`.
///
/// Braces inside JSON string literals (including escaped quotes) do not count
/// towards the balance. Returns `None` when no opening brace is found or the
/// object never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
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

/// Extract and decode the first JSON object in a completion
pub fn parse_json_object(text: &str) -> GenerationResult<Value> {
    let json = extract_json_object(text).ok_or_else(|| {
        GenerationError::MalformedResponse("no JSON object found in response".to_string())
    })?;

    serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {}", e)))
}

/// Remove a surrounding markdown code fence (```lang ... ```), if any
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_inside_prose() {
        let text = r#"Sure! {"type":"blur","actions":[]} thanks"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"type":"blur","actions":[]}"#)
        );
        assert_eq!(
            parse_json_object(text).unwrap(),
            json!({ "type": "blur", "actions": [] })
        );
    }

    #[test]
    fn test_first_object_wins() {
        let text = r#"{"a":1} and then {"b":2}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_nested_and_braces_in_strings() {
        let text = r#"Result: {"condition":"x === '}'","nested":{"q":"\"{"}} done"#;
        let json = extract_json_object(text).unwrap();
        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["condition"], "x === '}'");
        assert_eq!(value["nested"]["q"], "\"{");
    }

    #[test]
    fn test_fenced_completion() {
        let text = "```json\n{\"type\": \"change\", \"actions\": []}\n```";
        assert_eq!(
            parse_json_object(text).unwrap(),
            json!({ "type": "change", "actions": [] })
        );
    }

    #[test]
    fn test_missing_or_unbalanced() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object(r#"{"open": true"#).is_none());
        assert!(matches!(
            parse_json_object("nothing"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_json_object("{not json}"),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\nhello\n```"), "hello");
        assert_eq!(strip_code_fences("```text\nhello world\n```"), "hello world");
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }
}
