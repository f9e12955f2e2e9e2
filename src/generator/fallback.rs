//! Deterministic fragments used when a completion cannot be used

use serde_json::Value;

use crate::domain::{
    ActionType, EventAction, EventType, FieldEvent, RuleDescriptor, RuleKind, ValidationAnalysis,
    ValidationRule,
};

const DEFAULT_TRIGGER: &str = "blur";

/// Map the analysis rule descriptors straight onto the rule schema.
///
/// Each descriptor yields one rule. Missing messages get a default text and
/// missing triggers default to `blur`. Numeric bounds accept numbers or
/// numeric strings; a bound that cannot be read as a number is left unset.
pub fn synthesize_rules(analysis: &ValidationAnalysis) -> Vec<ValidationRule> {
    analysis.rules.iter().map(synthesize_rule).collect()
}

fn synthesize_rule(descriptor: &RuleDescriptor) -> ValidationRule {
    let value = descriptor.value.as_ref();
    let mut rule = ValidationRule {
        trigger: Some(
            descriptor
                .trigger
                .clone()
                .unwrap_or_else(|| DEFAULT_TRIGGER.to_string()),
        ),
        ..Default::default()
    };

    let default_message = match descriptor.kind {
        RuleKind::Required => {
            rule.required = Some(true);
            "This field is required".to_string()
        }
        RuleKind::Min => {
            rule.min = value.and_then(as_number);
            match rule.min {
                Some(min) => format!("Value must be at least {}", min),
                None => "Value is too small".to_string(),
            }
        }
        RuleKind::Max => {
            rule.max = value.and_then(as_number);
            match rule.max {
                Some(max) => format!("Value must be at most {}", max),
                None => "Value is too large".to_string(),
            }
        }
        RuleKind::Pattern => {
            rule.pattern = value.and_then(as_text);
            "Invalid format".to_string()
        }
        RuleKind::Custom => {
            rule.validator = Some(value.and_then(as_text).unwrap_or_else(|| "custom".to_string()));
            "Invalid value".to_string()
        }
    };

    rule.message = Some(descriptor.message.clone().unwrap_or(default_message));
    rule
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn event_phrase(event_type: &EventType) -> &'static str {
    match event_type.as_str() {
        "blur" => "on losing focus",
        "change" => "on value change",
        "focus" => "on gaining focus",
        "input" => "on input",
        "click" => "on click",
        _ => "on trigger",
    }
}

fn action_phrase(action_type: Option<&ActionType>) -> &'static str {
    match action_type.map(|a| a.as_str()) {
        Some("setValue") => "sets a value",
        Some("calculate") => "calculates",
        Some("validate") => "validates",
        Some("show") => "shows it",
        Some("hide") => "hides it",
        Some("enable") => "enables it",
        Some("disable") => "disables it",
        Some("callApi") => "calls an API",
        _ => "performs an action",
    }
}

/// Fixed-table summary used when the description call fails
pub fn fallback_description(event_type: &EventType, action_type: Option<&ActionType>) -> String {
    format!(
        "when {}, automatically {}",
        event_phrase(event_type),
        action_phrase(action_type)
    )
}

/// Single-action event assembled from analysis or keyword hints.
///
/// Used only when the event policy is `fallback`; the result is validated
/// like any generated event.
pub fn fallback_event(
    event_type: EventType,
    action_type: ActionType,
    target_field: Option<&str>,
    condition: Option<String>,
    description: Option<String>,
) -> FieldEvent {
    let mut action = EventAction::new(action_type);
    if let Some(target) = target_field {
        action = action.targeting(target);
    }
    let mut event = FieldEvent::new(event_type).with_action(action);
    event.condition = condition;
    event.description = description;
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn descriptor(kind: RuleKind, value: Option<Value>) -> RuleDescriptor {
        RuleDescriptor {
            kind,
            value,
            message: None,
            trigger: None,
        }
    }

    #[test]
    fn test_synthesize_each_rule_kind() {
        let analysis = ValidationAnalysis {
            has_validation: true,
            rules: vec![
                descriptor(RuleKind::Required, None),
                descriptor(RuleKind::Min, Some(json!(18))),
                descriptor(RuleKind::Max, Some(json!("120"))),
                descriptor(RuleKind::Pattern, Some(json!("^\\d+$"))),
                RuleDescriptor {
                    kind: RuleKind::Custom,
                    value: Some(json!("checkAge")),
                    message: Some("Age looks wrong".to_string()),
                    trigger: Some("change".to_string()),
                },
            ],
            description: "age between 18 and 120".to_string(),
            recommended_target_field: Some("age".to_string()),
        };

        let rules = synthesize_rules(&analysis);
        assert_eq!(rules.len(), 5);
        assert_eq!(rules[0].required, Some(true));
        assert_eq!(rules[0].message.as_deref(), Some("This field is required"));
        assert_eq!(rules[0].trigger.as_deref(), Some("blur"));
        assert_eq!(rules[1].min, Some(18.0));
        assert_eq!(rules[1].message.as_deref(), Some("Value must be at least 18"));
        assert_eq!(rules[2].max, Some(120.0));
        assert_eq!(rules[3].pattern.as_deref(), Some("^\\d+$"));
        assert_eq!(rules[4].validator.as_deref(), Some("checkAge"));
        assert_eq!(rules[4].message.as_deref(), Some("Age looks wrong"));
        assert_eq!(rules[4].trigger.as_deref(), Some("change"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let analysis = ValidationAnalysis {
            has_validation: true,
            rules: vec![descriptor(RuleKind::Min, Some(json!("abc")))],
            description: String::new(),
            recommended_target_field: None,
        };
        let first = synthesize_rules(&analysis);
        assert_eq!(first, synthesize_rules(&analysis));
        assert_eq!(first[0].min, None);
        assert_eq!(first[0].message.as_deref(), Some("Value is too small"));
    }

    #[test]
    fn test_fallback_event_shape() {
        let event = fallback_event(
            EventType::Change,
            ActionType::Hide,
            Some("remark"),
            Some("formData.type === 'internal'".to_string()),
            None,
        );
        assert_eq!(event.actions.len(), 1);
        assert_eq!(event.actions[0].target_field.as_deref(), Some("remark"));
        assert_eq!(event.primary_action(), Some(&ActionType::Hide));
        assert!(event.condition.is_some());
    }

    #[test]
    fn test_fallback_description_tables() {
        assert_eq!(
            fallback_description(&EventType::Blur, Some(&ActionType::SetValue)),
            "when on losing focus, automatically sets a value"
        );
        assert_eq!(
            fallback_description(&EventType::Change, Some(&ActionType::Hide)),
            "when on value change, automatically hides it"
        );
        assert_eq!(
            fallback_description(
                &EventType::Other("click".to_string()),
                Some(&ActionType::from("calculate"))
            ),
            "when on click, automatically calculates"
        );
        assert_eq!(
            fallback_description(&EventType::Other("hover".to_string()), None),
            "when on trigger, automatically performs an action"
        );
    }
}
