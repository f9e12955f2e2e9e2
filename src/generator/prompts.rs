//! Prompt templates for each generation stage
//!
//! Every template is a struct whose fields are its named slots. The library
//! refuses to register a template whose body does not reference each declared
//! slot as `{{ slot }}`, so an edited template cannot silently drop a
//! substitution. Rendering goes through Tera with a context built from the
//! slot struct.

use serde::Serialize;
use tera::{Context, Tera};

use super::error::{GenerationError, GenerationResult};
use super::hints::FieldSummary;
use crate::domain::{
    ActionType, AnalysisCategory, FieldConfig, FieldEvent, EVENT_VOCABULARY,
};

/// A prompt with named slots
pub trait PromptTemplate: Serialize {
    /// Registration name inside the library
    const NAME: &'static str;
    /// Template body
    const SOURCE: &'static str;
    /// Slot names; each must appear in `SOURCE` and as a struct field
    const SLOTS: &'static [&'static str];
}

/// Render the field inventory embedded in every prompt.
///
/// One line per field: name, label, type, flags, validation summary and the
/// current component config.
pub fn field_inventory(fields: &[FieldConfig]) -> String {
    fields
        .iter()
        .map(|field| {
            let mut line = format!(
                "- {} ({}): {}",
                field.field_name, field.field_label, field.field_type
            );
            let flags = field.flags();
            if !flags.is_empty() {
                line.push_str(&format!(" [{}]", flags.join(", ")));
            }
            let rules = field.validation_rules();
            if !rules.is_empty() {
                let summary: Vec<String> = rules.iter().map(|r| r.summary()).collect();
                line.push_str(&format!("; validation: {}", summary.join(" | ")));
            }
            if let Some(config) = field.component_config.as_ref().filter(|c| !c.is_empty()) {
                line.push_str(&format!("; config: {}", config.to_compact_json()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain `- label (name): type` list used by the single-shot prompt
pub fn field_list(fields: &[FieldSummary]) -> String {
    fields
        .iter()
        .map(|f| format!("- {} ({}): {}", f.label, f.name, f.field_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON skeleton of the sections the enhanced analysis must return
pub fn response_shape(categories: &[AnalysisCategory]) -> String {
    let sections: Vec<String> = categories
        .iter()
        .map(|category| match category {
            AnalysisCategory::Event => format!(
                r#"  "eventAnalysis": {{
    "eventType": "one of: {}",
    "condition": "trigger condition expression (optional)",
    "action": "what should happen",
    "targetField": "fieldName that is changed",
    "sourceField": "fieldName the condition reads (optional)",
    "description": "one-sentence summary",
    "recommendedTargetField": "fieldName best suited to hold this event"
  }}"#,
                EVENT_VOCABULARY.joined()
            ),
            AnalysisCategory::Validation => r#"  "validationAnalysis": {
    "hasValidation": true,
    "rules": [
      { "type": "required | min | max | pattern | custom", "value": "rule argument (optional)", "message": "error text", "trigger": "blur | change" }
    ],
    "description": "one-sentence summary",
    "recommendedTargetField": "fieldName the rules belong to"
  }"#
            .to_string(),
            AnalysisCategory::ComponentConfig => r#"  "componentConfigAnalysis": {
    "hasConfig": true,
    "config": { "placeholder": "...", "clearable": true },
    "description": "one-sentence summary",
    "recommendedTargetField": "fieldName the config belongs to"
  }"#
            .to_string(),
        })
        .collect();

    format!("{{\n{}\n}}", sections.join(",\n"))
}

/// Stage 1, basic mode
#[derive(Debug, Serialize)]
pub struct IntentAnalysisPrompt {
    pub description: String,
    pub field_inventory: String,
    pub event_types: String,
}

impl PromptTemplate for IntentAnalysisPrompt {
    const NAME: &'static str = "intent_analysis";
    const SLOTS: &'static [&'static str] = &["description", "field_inventory", "event_types"];
    const SOURCE: &'static str = r#"You are an expert in configuring form events. Analyze the user's request and work out the event logic they want.

User request: {{ description }}

Relevant fields:
{{ field_inventory }}

Allowed event types: {{ event_types }}

Return your analysis as JSON:
{
  "eventType": "one of the allowed event types",
  "condition": "trigger condition (optional)",
  "action": "description of the action to perform",
  "targetField": "name of the target field",
  "sourceField": "name of the source field, if a condition reads one"
}

Requirements:
1. Identify the event type precisely
2. Make the trigger condition explicit
3. Describe the action clearly
4. Identify the target and source fields correctly

Return only the JSON, nothing else."#;
}

/// Stage 1, enhanced mode with per-category sections
#[derive(Debug, Serialize)]
pub struct EnhancedIntentPrompt {
    pub description: String,
    pub field_inventory: String,
    pub event_types: String,
    pub action_types: String,
    pub categories: String,
    pub response_shape: String,
}

impl PromptTemplate for EnhancedIntentPrompt {
    const NAME: &'static str = "enhanced_intent_analysis";
    const SLOTS: &'static [&'static str] = &[
        "description",
        "field_inventory",
        "event_types",
        "action_types",
        "categories",
        "response_shape",
    ];
    const SOURCE: &'static str = r#"You are an expert in dynamic form configuration. Analyze the user's request and split it into the requested categories: {{ categories }}.

User request: {{ description }}

Selected fields (name, label, type, flags, existing validation, existing component config):
{{ field_inventory }}

Allowed event types: {{ event_types }}
Allowed action types: {{ action_types }}

Guidelines:
- Event logic covers reactions between fields (set a value, show/hide, enable/disable, call an API).
- Validation covers rules the value must satisfy (required, min, max, pattern, custom).
- Component config covers how the widget behaves (placeholder, clearable, filterable, multiple, min, max, precision, format).
- Set "hasValidation" or "hasConfig" to false when the request does not ask for that category.
- Every field you reference must be one of the selected fields.

Return only JSON in this shape:
{{ response_shape }}"#;
}

/// Stage 2, event fragment
#[derive(Debug, Serialize)]
pub struct EventConfigPrompt {
    pub event_type: String,
    pub condition: String,
    pub action: String,
    pub target_field: String,
    pub source_field: String,
    pub field_inventory: String,
    pub event_types: String,
    pub action_types: String,
}

impl PromptTemplate for EventConfigPrompt {
    const NAME: &'static str = "event_config";
    const SLOTS: &'static [&'static str] = &[
        "event_type",
        "condition",
        "action",
        "target_field",
        "source_field",
        "field_inventory",
        "event_types",
        "action_types",
    ];
    const SOURCE: &'static str = r#"You generate form event configuration. Turn the intent analysis below into an event configuration.

Intent analysis:
- Event type: {{ event_type }}
- Trigger condition: {{ condition }}
- Action: {{ action }}
- Target field: {{ target_field }}
- Source field: {{ source_field }}

All fields:
{{ field_inventory }}

Produce JSON in this format:
{
  "type": "event type",
  "condition": "condition expression (optional)",
  "description": "short summary",
  "actions": [
    {
      "type": "action type",
      "targetField": "target field",
      "sourceExpression": "value or expression",
      "value": "literal value (optional)",
      "condition": "per-action condition (optional)"
    }
  ]
}

The event type must be one of: {{ event_types }}
Action types are: {{ action_types }}
Every targetField must be one of the field names listed above.

Condition expression examples:
- "formData.product && formData.product.startsWith('bt')"
- "formData.price > 100"
- "formData.category === 'electronics'"

Value expression examples:
- "formData.price * 10"
- "'new value'"
- "formData.product.startsWith('bt') ? formData.price * 10 : formData.price"

Return only the JSON configuration, nothing else."#;
}

/// Stage 2, validation fragment
#[derive(Debug, Serialize)]
pub struct ValidationConfigPrompt {
    pub target_field: String,
    pub analysis_description: String,
    pub rule_descriptors: String,
    pub field_inventory: String,
}

impl PromptTemplate for ValidationConfigPrompt {
    const NAME: &'static str = "validation_config";
    const SLOTS: &'static [&'static str] = &[
        "target_field",
        "analysis_description",
        "rule_descriptors",
        "field_inventory",
    ];
    const SOURCE: &'static str = r#"You generate form validation rules. Convert the analysis below into validation rules for field "{{ target_field }}".

Analysis: {{ analysis_description }}
Proposed rules:
{{ rule_descriptors }}

All fields:
{{ field_inventory }}

Produce JSON in this format:
{
  "rules": [
    {
      "required": true,
      "message": "error message",
      "trigger": "blur or change",
      "min": 0,
      "max": 100,
      "pattern": "regular expression",
      "validator": "custom validator name"
    }
  ]
}

Include only the keys each rule needs. Return only the JSON, nothing else."#;
}

/// Stage 2, component config fragment
#[derive(Debug, Serialize)]
pub struct ComponentConfigPrompt {
    pub target_field: String,
    pub field_type: String,
    pub analysis_description: String,
    pub proposed_config: String,
    pub field_inventory: String,
}

impl PromptTemplate for ComponentConfigPrompt {
    const NAME: &'static str = "component_config";
    const SLOTS: &'static [&'static str] = &[
        "target_field",
        "field_type",
        "analysis_description",
        "proposed_config",
        "field_inventory",
    ];
    const SOURCE: &'static str = r#"You configure form UI components. Produce the component configuration for field "{{ target_field }}" (type {{ field_type }}).

Analysis: {{ analysis_description }}
Proposed config: {{ proposed_config }}

All fields:
{{ field_inventory }}

Recognized keys: placeholder, clearable, filterable, multiple, min, max, precision, format. Other keys are passed to the component unchanged.

Return only a JSON object with the configuration, nothing else."#;
}

/// Stage 3, plain-language summary of an event
#[derive(Debug, Serialize)]
pub struct DescriptionPrompt {
    pub target_label: String,
    pub target_field: String,
    pub event_json: String,
}

impl PromptTemplate for DescriptionPrompt {
    const NAME: &'static str = "natural_description";
    const SLOTS: &'static [&'static str] = &["target_label", "target_field", "event_json"];
    const SOURCE: &'static str = r#"Rewrite the following technical configuration as a description an ordinary user understands.

Target field: {{ target_label }} ({{ target_field }})
Event configuration:
{{ event_json }}

Requirements:
1. Use simple language and avoid technical terms
2. Say clearly when it triggers and what it does
3. Keep it under 80 characters
4. Keep the tone friendly

Example descriptions:
- "After the product name is entered, the unit price is calculated automatically"
- "When a different category is chosen, related options update automatically"

Return only the description text, nothing else:"#;
}

/// Single-shot event generation straight from the description
#[derive(Debug, Serialize)]
pub struct DirectEventPrompt {
    pub description: String,
    pub field_list: String,
    pub event_types: String,
    pub action_types: String,
}

impl PromptTemplate for DirectEventPrompt {
    const NAME: &'static str = "direct_event";
    const SLOTS: &'static [&'static str] =
        &["description", "field_list", "event_types", "action_types"];
    const SOURCE: &'static str = r#"You are a form event configuration generator. Produce an accurate event configuration JSON from the user's natural-language request.

## User request
{{ description }}

## Available fields
{{ field_list }}

## Supported event types
{{ event_types }}

## Supported action types
{{ action_types }}

## Rules
1. Read field values as formData.fieldName
2. String checks: formData.fieldName.startsWith("value"), .endsWith("value"), .includes("value")
3. Arithmetic uses the usual operators (+, -, *, /, %)
4. Conditions use JavaScript expression syntax
5. Every targetField must be one of the available fields

## Output format
Output strictly this JSON and nothing else:

{
  "type": "event type",
  "condition": "trigger condition (optional)",
  "actions": [
    {
      "type": "action type",
      "targetField": "target field name",
      "sourceExpression": "source expression or formula",
      "value": "literal value (optional)",
      "condition": "per-action condition (optional)"
    }
  ]
}

## Example
Request: "When the product name starts with bt, multiply the unit price by 10 when it loses focus"
Configuration:
{
  "type": "blur",
  "actions": [
    {
      "type": "setValue",
      "targetField": "price",
      "sourceExpression": "formData.price * 10",
      "condition": "formData.product && formData.product.startsWith('bt')"
    }
  ]
}

Generate the configuration for the current request:"#;
}

/// Registered templates
pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    /// Register every built-in template, checking slot coverage
    pub fn new() -> GenerationResult<Self> {
        let mut library = Self {
            tera: Tera::default(),
        };
        library.register::<IntentAnalysisPrompt>()?;
        library.register::<EnhancedIntentPrompt>()?;
        library.register::<EventConfigPrompt>()?;
        library.register::<ValidationConfigPrompt>()?;
        library.register::<ComponentConfigPrompt>()?;
        library.register::<DescriptionPrompt>()?;
        library.register::<DirectEventPrompt>()?;
        Ok(library)
    }

    fn register<T: PromptTemplate>(&mut self) -> GenerationResult<()> {
        check_slots(T::NAME, T::SOURCE, T::SLOTS)?;
        self.tera.add_raw_template(T::NAME, T::SOURCE)?;
        Ok(())
    }

    /// Render a template from its slot values
    pub fn render<T: PromptTemplate>(&self, slots: &T) -> GenerationResult<String> {
        let context = Context::from_serialize(slots)?;
        Ok(self.tera.render(T::NAME, &context)?)
    }
}

/// Fail if `source` does not reference every slot as `{{ slot }}`
pub(crate) fn check_slots(name: &str, source: &str, slots: &[&str]) -> GenerationResult<()> {
    let missing: Vec<&str> = slots
        .iter()
        .copied()
        .filter(|slot| !source.contains(&format!("{{{{ {} }}}}", slot)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GenerationError::Template(format!(
            "template '{}' does not use slot(s): {}",
            name,
            missing.join(", ")
        )))
    }
}

/// Slot values shared by every template that lists event/action types
pub(crate) fn event_types() -> String {
    EVENT_VOCABULARY.joined()
}

pub(crate) fn action_types() -> String {
    ActionType::joined()
}

pub(crate) fn event_json(event: &FieldEvent) -> String {
    serde_json::to_string_pretty(event).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComponentConfig, FieldType, FieldValidation, ValidationRule};
    use serde_json::Value;

    fn slot_keys<T: PromptTemplate>(slots: &T) -> Vec<String> {
        let Value::Object(map) = serde_json::to_value(slots).unwrap() else {
            panic!("slot struct must serialize to an object");
        };
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn sorted(slots: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_builtin_templates_register() {
        assert!(PromptLibrary::new().is_ok());
    }

    #[test]
    fn test_missing_slot_is_rejected() {
        let err = check_slots("broken", "Hello {{ name }}", &["name", "field_inventory"])
            .unwrap_err();
        match err {
            GenerationError::Template(msg) => assert!(msg.contains("field_inventory")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_slot_structs_match_declared_slots() {
        let intent = IntentAnalysisPrompt {
            description: String::new(),
            field_inventory: String::new(),
            event_types: String::new(),
        };
        assert_eq!(slot_keys(&intent), sorted(IntentAnalysisPrompt::SLOTS));

        let description = DescriptionPrompt {
            target_label: String::new(),
            target_field: String::new(),
            event_json: String::new(),
        };
        assert_eq!(slot_keys(&description), sorted(DescriptionPrompt::SLOTS));
    }

    #[test]
    fn test_render_embeds_vocabulary_and_inventory() {
        let library = PromptLibrary::new().unwrap();
        let fields = vec![
            FieldConfig::new("product", FieldType::String, "Product"),
            FieldConfig::new("price", FieldType::Float, "Price").required(),
        ];
        let prompt = library
            .render(&IntentAnalysisPrompt {
                description: "multiply price by 10".to_string(),
                field_inventory: field_inventory(&fields),
                event_types: event_types(),
            })
            .unwrap();

        assert!(prompt.contains("User request: multiply price by 10"));
        assert!(prompt.contains("- price (Price): float [required]"));
        assert!(prompt.contains("Allowed event types: change, blur"));
        assert!(!prompt.contains("focus"));
    }

    #[test]
    fn test_inventory_includes_validation_and_config() {
        let mut field = FieldConfig::new("age", FieldType::Integer, "Age")
            .with_component_config(ComponentConfig::new().with("min", 1i64));
        field.validation = Some(FieldValidation {
            rules: vec![ValidationRule {
                required: Some(true),
                ..Default::default()
            }],
        });

        assert_eq!(
            field_inventory(&[field]),
            r#"- age (Age): integer; validation: required; config: {"min":1}"#
        );
    }

    #[test]
    fn test_response_shape_only_lists_requested_sections() {
        let shape = response_shape(&[AnalysisCategory::Validation]);
        assert!(shape.contains("validationAnalysis"));
        assert!(!shape.contains("eventAnalysis"));
        assert!(!shape.contains("componentConfigAnalysis"));
    }
}
