//! Decoding completions into typed analysis results and fragments

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::error::{GenerationError, GenerationResult};
use super::extract::{parse_json_object, strip_code_fences};
use crate::domain::{
    AnalysisCategory, ComponentConfig, ComponentConfigAnalysis, EnhancedIntentAnalysis,
    EventAnalysis, FieldEvent, IntentAnalysis, ValidationAnalysis, ValidationRule,
};

/// Longest description kept before truncation
pub const MAX_DESCRIPTION_CHARS: usize = 80;

pub const DEFAULT_DESCRIPTION: &str = "Smart event configuration generated";

const DESCRIPTION_PREFIXES: &[&str] = &[
    "Description:",
    "Natural language description:",
    "Summary:",
    "描述：",
    "自然语言描述：",
    "说明：",
];

fn malformed(message: impl Into<String>) -> GenerationError {
    GenerationError::MalformedResponse(message.into())
}

fn has_text(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_str)
        .map_or(false, |s| !s.trim().is_empty())
}

fn require_keys(value: &Value, section: &str, keys: &[&str]) -> GenerationResult<()> {
    let missing: Vec<&str> = keys.iter().copied().filter(|k| !has_text(value, k)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(malformed(format!(
            "{} is missing required key(s): {}",
            section,
            missing.join(", ")
        )))
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> GenerationResult<T> {
    serde_json::from_value(value).map_err(|e| malformed(format!("invalid {}: {}", what, e)))
}

/// Basic-mode intent analysis: `eventType`, `action` and `targetField` are required
pub fn parse_intent_analysis(completion: &str) -> GenerationResult<IntentAnalysis> {
    let value = parse_json_object(completion)?;
    require_keys(&value, "intent analysis", &["eventType", "action", "targetField"])?;
    decode(value, "intent analysis")
}

/// Optional section of the enhanced analysis. An unreadable section is
/// dropped with a warning rather than failing the whole analysis.
fn optional_section<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    let section = value.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(section.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(section = key, error = %err, "Dropping unreadable analysis section");
            None
        }
    }
}

/// Enhanced intent analysis.
///
/// The event section and its `eventType`/`action`/`targetField` keys are
/// required whenever the event category was requested. Validation and
/// component-config sections are optional: a validation section that sets
/// `hasValidation` without a `rules` array is dropped, as is any section
/// that does not decode. Sections for categories that were not requested
/// are never inspected.
pub fn parse_enhanced_intent(
    completion: &str,
    categories: &[AnalysisCategory],
) -> GenerationResult<EnhancedIntentAnalysis> {
    let value = parse_json_object(completion)?;
    let mut analysis = EnhancedIntentAnalysis::default();

    if categories.contains(&AnalysisCategory::Event) {
        let event = value
            .get("eventAnalysis")
            .filter(|v| v.is_object())
            .ok_or_else(|| malformed("eventAnalysis section is missing"))?;
        require_keys(event, "eventAnalysis", &["eventType", "action", "targetField"])?;
        analysis.event_analysis = Some(decode::<EventAnalysis>(event.clone(), "eventAnalysis")?);
    }

    if categories.contains(&AnalysisCategory::Validation) {
        analysis.validation_analysis =
            optional_section::<ValidationAnalysis>(&value, "validationAnalysis").filter(|_| {
                let section = &value["validationAnalysis"];
                let active = section
                    .get("hasValidation")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if active && !section.get("rules").map_or(false, Value::is_array) {
                    warn!("validationAnalysis sets hasValidation but has no rules array, dropping it");
                    return false;
                }
                true
            });
    }

    if categories.contains(&AnalysisCategory::ComponentConfig) {
        analysis.component_config_analysis =
            optional_section::<ComponentConfigAnalysis>(&value, "componentConfigAnalysis");
    }

    Ok(analysis)
}

/// Event fragment: needs `type` and an `actions` array
pub fn parse_event_config(completion: &str) -> GenerationResult<FieldEvent> {
    let value = parse_json_object(completion)?;
    if !has_text(&value, "type") {
        return Err(malformed("event configuration has no type"));
    }
    if !value.get("actions").map_or(false, Value::is_array) {
        return Err(malformed("event configuration has no actions array"));
    }
    decode(value, "event configuration")
}

/// Validation fragment: needs a `rules` array
pub fn parse_validation_config(completion: &str) -> GenerationResult<Vec<ValidationRule>> {
    let value = parse_json_object(completion)?;
    let rules = value
        .get("rules")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| malformed("validation configuration has no rules array"))?;
    decode(rules, "validation rules")
}

/// Component-config fragment: any JSON object
pub fn parse_component_config(completion: &str) -> GenerationResult<ComponentConfig> {
    let value = parse_json_object(completion)?;
    ComponentConfig::from_json(&value)
        .ok_or_else(|| malformed("component configuration is not an object"))
}

/// Clean up a plain-language description reply
pub fn parse_natural_description(completion: &str) -> String {
    let mut text = strip_code_fences(completion).trim();

    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')] {
        if text.len() >= 2 && text.starts_with(open) && text.ends_with(close) {
            text = text[open.len_utf8()..text.len() - close.len_utf8()].trim();
        }
    }

    for prefix in DESCRIPTION_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
            break;
        }
    }

    if text.is_empty() {
        return DEFAULT_DESCRIPTION.to_string();
    }

    if text.chars().count() > MAX_DESCRIPTION_CHARS {
        let truncated: String = text.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
