//! Form and field definitions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::component::ComponentConfig;
use super::data_source::DataSource;
use super::event::FieldEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Date,
    Select,
    Radio,
    Checkbox,
    Textarea,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Textarea => "textarea",
        }
    }

    /// Whether the widget picks from a data source
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule of a field's validation list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// "blur" or "change"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Name of a custom validator function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl ValidationRule {
    /// Short human summary, e.g. `required` or `min=0`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.required == Some(true) {
            parts.push("required".to_string());
        }
        if let Some(min) = self.min {
            parts.push(format!("min={}", min));
        }
        if let Some(max) = self.max {
            parts.push(format!("max={}", max));
        }
        if let Some(pattern) = &self.pattern {
            parts.push(format!("pattern={}", pattern));
        }
        if let Some(validator) = &self.validator {
            parts.push(format!("validator={}", validator));
        }
        if parts.is_empty() {
            "custom".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

fn default_true() -> bool {
    true
}

/// One form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Unique within the owning form
    pub field_name: String,
    pub field_type: FieldType,
    pub field_label: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FieldEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_config: Option<ComponentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FieldLayout>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_name: name.into(),
            field_type,
            field_label: label.into(),
            visible: true,
            editable: true,
            required: false,
            disabled: false,
            data_source: None,
            events: Vec::new(),
            component_config: None,
            validation: None,
            layout: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    pub fn with_event(mut self, event: FieldEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_component_config(mut self, config: ComponentConfig) -> Self {
        self.component_config = Some(config);
        self
    }

    /// Flags surfaced to the LLM in field inventories
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        }
        if self.disabled {
            flags.push("disabled");
        }
        if !self.visible {
            flags.push("hidden");
        }
        if !self.editable {
            flags.push("readonly");
        }
        flags
    }

    pub fn validation_rules(&self) -> &[ValidationRule] {
        self.validation
            .as_ref()
            .map(|v| v.rules.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelWidth {
    Pixels(u32),
    Css(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Left,
    Right,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormSize {
    Large,
    Default,
    Small,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gutter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_width: Option<LabelWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<LabelPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FormSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_on_rule_change: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_required_asterisk: Option<bool>,
}

/// A whole form: ordered fields plus layout and validation display options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub fields: Vec<FieldConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FormLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FormValidationOptions>,
}

impl FormConfig {
    pub fn new(fields: Vec<FieldConfig>) -> Self {
        Self {
            fields,
            layout: None,
            validation: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn field_names(&self) -> HashSet<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }

    /// Fields whose name appears in `names`, in form order
    pub fn select_fields(&self, names: &[String]) -> Vec<FieldConfig> {
        self.fields
            .iter()
            .filter(|f| names.iter().any(|n| n == &f.field_name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_defaults() {
        let field: FieldConfig = serde_json::from_value(json!({
            "fieldName": "price",
            "fieldType": "float",
            "fieldLabel": "Price"
        }))
        .unwrap();
        assert!(field.visible);
        assert!(field.editable);
        assert!(!field.required);
        assert!(!field.disabled);
        assert!(field.events.is_empty());
        assert!(field.flags().is_empty());
    }

    #[test]
    fn test_flags() {
        let mut field = FieldConfig::new("code", FieldType::String, "Code").required();
        field.editable = false;
        field.visible = false;
        assert_eq!(field.flags(), vec!["required", "hidden", "readonly"]);
    }

    #[test]
    fn test_label_width_accepts_number_or_css() {
        let layout: FormLayout =
            serde_json::from_value(json!({ "labelWidth": "120px", "labelPosition": "right" }))
                .unwrap();
        assert_eq!(layout.label_width, Some(LabelWidth::Css("120px".to_string())));

        let layout: FormLayout = serde_json::from_value(json!({ "labelWidth": 100 })).unwrap();
        assert_eq!(layout.label_width, Some(LabelWidth::Pixels(100)));
    }

    #[test]
    fn test_rule_summary() {
        let rule = ValidationRule {
            required: Some(true),
            min: Some(0.0),
            ..Default::default()
        };
        assert_eq!(rule.summary(), "required, min=0");
    }
}
