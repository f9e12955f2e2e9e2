//! Structural checks on generated event configurations

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{FieldConfig, FieldEvent, EVENT_VOCABULARY};

/// Outcome of checking a generated event against a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check an event against the vocabulary and the form's field names.
///
/// Reports, in order: an event type outside [`EVENT_VOCABULARY`], then for
/// each action (1-based) an unknown action type and a `targetField` that is
/// not in `fields`. Each invalid reference yields exactly one error.
pub fn validate_event_config(event: &FieldEvent, fields: &[FieldConfig]) -> ValidationReport {
    let known: HashSet<&str> = fields.iter().map(|f| f.field_name.as_str()).collect();
    let mut errors = Vec::new();

    if !EVENT_VOCABULARY.contains(&event.event_type) {
        errors.push(format!(
            "Invalid event type: {} (allowed: {})",
            event.event_type,
            EVENT_VOCABULARY.joined()
        ));
    }

    for (index, action) in event.actions.iter().enumerate() {
        let position = index + 1;
        if !action.action_type.is_known() {
            errors.push(format!(
                "action {}: invalid action type: {}",
                position, action.action_type
            ));
        }
        if let Some(target) = &action.target_field {
            if !known.contains(target.as_str()) {
                errors.push(format!(
                    "action {}: target field {} does not exist",
                    position, target
                ));
            }
        }
    }

    ValidationReport::from_errors(errors)
}
