use std::collections::HashMap;
use thiserror::Error;

use crate::adapters::dictionary_client::DictionaryConfig;
use crate::catalog::{CatalogEntry, DataSourceCatalog};
use crate::config::Settings;
use crate::domain::{DataSource, FieldConfig, FormConfig, EVENT_VOCABULARY};
use crate::generator::GenerationSettings;
use crate::llm::LlmConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

fn collect(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_llm(&settings.llm) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_dictionary(&settings.dictionary) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_generation(&settings.generation) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_data_sources(&settings.data_sources) {
            errors.extend(e);
        }

        collect(errors)
    }

    /// Structural checks on a form configuration; all problems are reported
    pub fn validate_form(form: &FormConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();

        for (idx, field) in form.fields.iter().enumerate() {
            if field.field_name.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "fields[{}].fieldName",
                    idx
                )));
            }

            if let Some(prev_idx) = seen_names.insert(field.field_name.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Field name '{}' appears at indices {} and {}",
                    field.field_name, prev_idx, idx
                )));
            }

            Self::validate_field_source(field, &mut errors);
        }

        let names = form.field_names();
        for field in &form.fields {
            for (event_idx, event) in field.events.iter().enumerate() {
                let path = format!("{}.events[{}]", field.field_name, event_idx);

                if !EVENT_VOCABULARY.contains(&event.event_type) {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("{}.type", path),
                        reason: format!(
                            "event type '{}' is not one of {}",
                            event.event_type,
                            EVENT_VOCABULARY.joined()
                        ),
                    });
                }

                for (action_idx, action) in event.actions.iter().enumerate() {
                    if !action.action_type.is_known() {
                        errors.push(ValidationError::InvalidValue {
                            field: format!("{}.actions[{}].type", path, action_idx),
                            reason: format!("unknown action type '{}'", action.action_type),
                        });
                    }

                    if let Some(target) = &action.target_field {
                        if !names.contains(target.as_str()) {
                            errors.push(ValidationError::CrossReference(format!(
                                "{}.actions[{}] targets unknown field '{}'",
                                path, action_idx, target
                            )));
                        }
                    }
                }
            }
        }

        collect(errors)
    }

    fn validate_field_source(field: &FieldConfig, errors: &mut Vec<ValidationError>) {
        let Some(DataSource::Api(api)) = &field.data_source else {
            return;
        };
        if api.url.is_empty() {
            errors.push(ValidationError::MissingField(format!(
                "{}.dataSource.url",
                field.field_name
            )));
        }
        for missing in api.searchable_violations() {
            errors.push(ValidationError::InvalidValue {
                field: format!("{}.dataSource", field.field_name),
                reason: format!("searchable source must declare {}", missing),
            });
        }
    }

    fn validate_llm(llm: &LlmConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if llm.endpoint.is_empty() {
            errors.push(ValidationError::MissingField("llm.endpoint".to_string()));
        }

        if llm.model.is_empty() {
            errors.push(ValidationError::MissingField("llm.model".to_string()));
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            errors.push(ValidationError::InvalidValue {
                field: "llm.temperature".to_string(),
                reason: "Temperature must be between 0 and 2".to_string(),
            });
        }

        if llm.max_tokens == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                reason: "max_tokens must be greater than 0".to_string(),
            });
        }

        if llm.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        collect(errors)
    }

    fn validate_dictionary(dictionary: &DictionaryConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if dictionary.base_url.is_empty() {
            errors.push(ValidationError::MissingField("dictionary.base_url".to_string()));
        }

        if dictionary.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "dictionary.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        collect(errors)
    }

    fn validate_generation(generation: &GenerationSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if generation.default_categories.is_empty() {
            errors.push(ValidationError::InvalidValue {
                field: "generation.default_categories".to_string(),
                reason: "At least one category must be listed".to_string(),
            });
        }

        collect(errors)
    }

    fn validate_data_sources(entries: &[CatalogEntry]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let builtin = DataSourceCatalog::builtin();
        let mut seen_ids = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if entry.id.is_empty() {
                errors.push(ValidationError::MissingField(format!("data_sources[{}].id", idx)));
            }

            if entry.url.is_empty() {
                errors.push(ValidationError::MissingField(format!("data_sources[{}].url", idx)));
            }

            if builtin.lookup(&entry.id).is_some() {
                errors.push(ValidationError::Duplicate(format!(
                    "Data source '{}' shadows a built-in entry",
                    entry.id
                )));
            }

            if let Some(prev_idx) = seen_ids.insert(entry.id.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Data source '{}' appears at indices {} and {}",
                    entry.id, prev_idx, idx
                )));
            }

            if let DataSource::Api(api) = entry.data_source() {
                for missing in api.searchable_violations() {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("data_sources[{}].source", idx),
                        reason: format!("searchable source must declare {}", missing),
                    });
                }
            }
        }

        collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ActionType, ApiSource, EventAction, EventType, FieldEvent, FieldType,
    };

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_valid_config() {
        assert!(ConfigValidator::validate(&settings()).is_ok());
    }

    #[test]
    fn test_invalid_llm_values() {
        let mut settings = settings();
        settings.llm.temperature = 3.5;
        settings.llm.max_tokens = 0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_default_categories() {
        let mut settings = settings();
        settings.generation.default_categories.clear();
        assert!(ConfigValidator::validate(&settings).is_err());
    }

    #[test]
    fn test_duplicate_data_source_ids() {
        let extra: CatalogEntry = serde_json::from_value(serde_json::json!({
            "id": "suppliers",
            "name": "Suppliers",
            "url": "http://localhost:3000/api/suppliers",
            "fields": [{ "key": "id", "label": "ID", "type": "number" }]
        }))
        .unwrap();
        let mut shadow = extra.clone();
        shadow.id = "users-list".to_string();

        let mut settings = settings();
        settings.data_sources = vec![extra.clone(), extra, shadow];

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::Duplicate(_)))
                .count(),
            2
        );
    }

    fn product_form() -> FormConfig {
        FormConfig::new(vec![
            FieldConfig::new("product", FieldType::Select, "Product").with_event(
                FieldEvent::new(EventType::Change)
                    .with_action(EventAction::new(ActionType::SetValue).targeting("price")),
            ),
            FieldConfig::new("price", FieldType::Float, "Price"),
        ])
    }

    #[test]
    fn test_valid_form() {
        assert!(ConfigValidator::validate_form(&product_form()).is_ok());
    }

    #[test]
    fn test_duplicate_field_names() {
        let mut form = product_form();
        form.fields
            .push(FieldConfig::new("price", FieldType::Integer, "Price again"));

        let errors = ConfigValidator::validate_form(&form).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::Duplicate(_)]));
    }

    #[test]
    fn test_form_errors_are_collected() {
        let form = FormConfig::new(vec![FieldConfig::new("product", FieldType::Select, "Product")
            .with_event(
                FieldEvent::new(EventType::Input)
                    .with_action(EventAction::new(ActionType::from("explode")).targeting("ghost")),
            )]);

        let errors = ConfigValidator::validate_form(&form).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::CrossReference(msg) if msg.contains("ghost"))));
    }

    #[test]
    fn test_searchable_source_requires_params_and_custom_data() {
        let mut api = ApiSource::new("http://localhost:3000/api/products/search");
        api.is_searchable = true;
        let form = FormConfig::new(vec![
            FieldConfig::new("product", FieldType::Select, "Product").with_data_source(DataSource::Api(api)),
        ]);

        let errors = ConfigValidator::validate_form(&form).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::InvalidValue { .. })));
    }
}
