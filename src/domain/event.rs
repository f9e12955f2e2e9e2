//! Field events and the actions they trigger

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Trigger kind of a field event.
///
/// Unknown strings are kept in `Other` so a generated configuration can be
/// reported on instead of being rejected during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Change,
    Blur,
    Focus,
    Input,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Change => "change",
            EventType::Blur => "blur",
            EventType::Focus => "focus",
            EventType::Input => "input",
            EventType::Other(s) => s,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "change" => EventType::Change,
            "blur" => EventType::Blur,
            "focus" => EventType::Focus,
            "input" => EventType::Input,
            _ => EventType::Other(value),
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        EventType::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of event types generated configurations may use.
///
/// Prompts and validators both read from [`EVENT_VOCABULARY`]; bump
/// `revision` whenever the list changes.
#[derive(Debug, Clone, Copy)]
pub struct EventVocabulary {
    pub revision: u32,
    pub event_types: &'static [EventType],
}

impl EventVocabulary {
    pub fn contains(&self, event_type: &EventType) -> bool {
        self.event_types.contains(event_type)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.event_types.iter().map(|t| t.as_str()).collect()
    }

    /// Comma-separated list, as embedded in prompts ("change, blur").
    pub fn joined(&self) -> String {
        self.names().join(", ")
    }
}

/// Revision 1 allowed change, focus, blur and input; revision 2 narrowed the
/// set to change and blur.
pub const EVENT_VOCABULARY: EventVocabulary = EventVocabulary {
    revision: 2,
    event_types: &[EventType::Change, EventType::Blur],
};

/// Effect executed when an event fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    SetValue,
    CallApi,
    Validate,
    Show,
    Hide,
    Enable,
    Disable,
    Other(String),
}

impl ActionType {
    pub const ALL: &'static [ActionType] = &[
        ActionType::SetValue,
        ActionType::Show,
        ActionType::Hide,
        ActionType::Enable,
        ActionType::Disable,
        ActionType::Validate,
        ActionType::CallApi,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::SetValue => "setValue",
            ActionType::CallApi => "callApi",
            ActionType::Validate => "validate",
            ActionType::Show => "show",
            ActionType::Hide => "hide",
            ActionType::Enable => "enable",
            ActionType::Disable => "disable",
            ActionType::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ActionType::Other(_))
    }

    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "setValue" => ActionType::SetValue,
            "callApi" => ActionType::CallApi,
            "validate" => ActionType::Validate,
            "show" => ActionType::Show,
            "hide" => ActionType::Hide,
            "enable" => ActionType::Enable,
            "disable" => ActionType::Disable,
            _ => ActionType::Other(value),
        }
    }
}

impl From<&str> for ActionType {
    fn from(value: &str) -> Self {
        ActionType::from(value.to_string())
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        match value {
            ActionType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote call issued by a `callApi` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
}

/// A single effect of a field event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Must name a field of the same form when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    /// Expression evaluated against form data, may embed a ternary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_expression: Option<String>,
    /// Literal fallback value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Per-action guard expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_config: Option<ApiConfig>,
}

impl EventAction {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            target_field: None,
            source_expression: None,
            value: None,
            condition: None,
            api_config: None,
        }
    }

    pub fn targeting(mut self, field: impl Into<String>) -> Self {
        self.target_field = Some(field.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.source_expression = Some(expression.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Field-level trigger bound to an ordered list of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Boolean expression evaluated against current form data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<EventAction>,
}

impl FieldEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            condition: None,
            description: None,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: EventAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Type of the first action, which is what summaries describe
    pub fn primary_action(&self) -> Option<&ActionType> {
        self.actions.first().map(|a| &a.action_type)
    }
}
