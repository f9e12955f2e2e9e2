//! LLM-backed generation of form configuration fragments
//!
//! A request runs as a fixed chain of single-turn completions:
//!
//! 1. intent analysis turns the description into a structured
//!    [`EnhancedIntentAnalysis`] (or a basic [`IntentAnalysis`]);
//! 2. one completion per requested category produces the event, validation
//!    and component-config fragments;
//! 3. optionally, a plain-language summary of the generated event.
//!
//! Generated events are always checked with [`validate_event_config`] before
//! they are handed back. What happens when a fragment completion is unusable
//! is decided per category by [`FragmentPolicy`]; transport and API errors
//! from the provider are never swallowed, except by the description stage
//! when its policy is `fallback`.

mod error;
mod extract;
mod fallback;
mod hints;
mod parse;
mod prompts;
mod settings;
mod validate;


pub use error::{GenerationError, GenerationResult};
pub use extract::{extract_json_object, parse_json_object};
pub use fallback::{fallback_description, synthesize_rules};
pub use hints::{extract_key_info, parse_description, DescriptionHints, EventKeyInfo, FieldSummary};
pub use parse::parse_natural_description;
pub use prompts::{PromptLibrary, PromptTemplate};
pub use settings::{FragmentPolicy, GenerationSettings, PolicySettings};
pub use validate::{validate_event_config, ValidationReport};

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{
    ActionType, AnalysisCategory, ComponentConfig, ComponentConfigAnalysis,
    EnhancedIntentAnalysis, EventAnalysis, EventType, FieldConfig, FieldEvent, FormConfig,
    IntentAnalysis, ValidationAnalysis, ValidationRule,
};
use crate::llm::LlmProvider;
use prompts::{
    ComponentConfigPrompt, DescriptionPrompt, DirectEventPrompt, EnhancedIntentPrompt,
    EventConfigPrompt, IntentAnalysisPrompt, ValidationConfigPrompt,
};

const NONE: &str = "none";

/// A generated event together with its validation result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventOutcome {
    /// Passed validation against the form
    Generated(FieldEvent),
    /// Parsed, but failed validation; kept for inspection
    Invalid {
        event: FieldEvent,
        report: ValidationReport,
    },
}

impl EventOutcome {
    fn from_validation(event: FieldEvent, fields: &[FieldConfig]) -> Self {
        let report = validate_event_config(&event, fields);
        if report.valid {
            EventOutcome::Generated(event)
        } else {
            EventOutcome::Invalid { event, report }
        }
    }

    pub fn event(&self) -> &FieldEvent {
        match self {
            EventOutcome::Generated(event) => event,
            EventOutcome::Invalid { event, .. } => event,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, EventOutcome::Generated(_))
    }
}

/// Input of a full generation run
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub description: String,
    /// Fields the user pointed at; embedded in the analysis prompt
    pub selected_fields: Vec<FieldConfig>,
    /// Every field of the form; targets are validated against these
    pub all_fields: Vec<FieldConfig>,
    /// Empty means the configured default categories
    pub categories: Vec<AnalysisCategory>,
    pub describe: bool,
}

impl GenerationRequest {
    /// Build a request from a form and the names of the selected fields
    pub fn for_form(
        form: &FormConfig,
        field_names: &[String],
        description: impl Into<String>,
    ) -> GenerationResult<Self> {
        if let Some(unknown) = field_names.iter().find(|n| form.field(n).is_none()) {
            return Err(GenerationError::InvalidRequest(format!(
                "field {} is not part of the form",
                unknown
            )));
        }

        Ok(Self {
            description: description.into(),
            selected_fields: form.select_fields(field_names),
            all_fields: form.fields.clone(),
            categories: Vec::new(),
            describe: false,
        })
    }

    pub fn with_categories(mut self, categories: Vec<AnalysisCategory>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_description_summary(mut self, describe: bool) -> Self {
        self.describe = describe;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFragment {
    /// Field the event should be attached to
    pub target_field: String,
    pub outcome: EventOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFragment {
    pub target_field: String,
    pub rules: Vec<ValidationRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfigFragment {
    pub target_field: String,
    pub config: ComponentConfig,
}

/// Everything one generation run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFragments {
    pub analysis: EnhancedIntentAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventFragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationFragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_config: Option<ComponentConfigFragment>,
}

/// Generation service; holds no per-request state
pub struct EventGeneratorService {
    llm: Arc<dyn LlmProvider>,
    prompts: PromptLibrary,
    settings: GenerationSettings,
}

impl EventGeneratorService {
    pub fn new(llm: Arc<dyn LlmProvider>, settings: GenerationSettings) -> GenerationResult<Self> {
        Ok(Self {
            llm,
            prompts: PromptLibrary::new()?,
            settings,
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    async fn ask(&self, stage: &str, prompt: String) -> GenerationResult<String> {
        tracing::debug!(
            stage,
            provider = self.llm.name(),
            model = self.llm.model(),
            prompt_chars = prompt.len(),
            "Requesting completion"
        );
        let completion = self.llm.complete_prompt(&prompt).await?;
        tracing::trace!(stage, completion = %completion, "Completion received");
        Ok(completion)
    }

    /// Stage 1, basic mode
    pub async fn analyze_intent(
        &self,
        description: &str,
        selected_fields: &[FieldConfig],
    ) -> GenerationResult<IntentAnalysis> {
        tracing::info!(fields = selected_fields.len(), "Analyzing intent");

        let prompt = self.prompts.render(&IntentAnalysisPrompt {
            description: description.to_string(),
            field_inventory: prompts::field_inventory(selected_fields),
            event_types: prompts::event_types(),
        })?;
        let completion = self.ask("intent", prompt).await?;
        let analysis = parse::parse_intent_analysis(&completion)?;

        tracing::info!(
            event_type = %analysis.event_type,
            target_field = %analysis.target_field,
            "Intent analysis complete"
        );
        Ok(analysis)
    }

    /// Stage 1, enhanced mode
    pub async fn analyze_enhanced_intent(
        &self,
        description: &str,
        selected_fields: &[FieldConfig],
        categories: &[AnalysisCategory],
    ) -> GenerationResult<EnhancedIntentAnalysis> {
        if categories.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "at least one analysis category is required".to_string(),
            ));
        }
        let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
        tracing::info!(
            fields = selected_fields.len(),
            categories = %names.join(","),
            "Analyzing enhanced intent"
        );

        let prompt = self.prompts.render(&EnhancedIntentPrompt {
            description: description.to_string(),
            field_inventory: prompts::field_inventory(selected_fields),
            event_types: prompts::event_types(),
            action_types: prompts::action_types(),
            categories: names.join(", "),
            response_shape: prompts::response_shape(categories),
        })?;
        let completion = self.ask("enhanced_intent", prompt).await?;
        let analysis = parse::parse_enhanced_intent(&completion, categories)?;

        tracing::info!(
            event = analysis.event_analysis.is_some(),
            validation = analysis.active_validation().is_some(),
            component_config = analysis.active_component_config().is_some(),
            "Enhanced intent analysis complete"
        );
        Ok(analysis)
    }

    /// Stage 2, event fragment
    pub async fn generate_event_config(
        &self,
        analysis: &EventAnalysis,
        all_fields: &[FieldConfig],
    ) -> GenerationResult<EventOutcome> {
        let prompt = self.prompts.render(&EventConfigPrompt {
            event_type: analysis.event_type.clone(),
            condition: analysis.condition.clone().unwrap_or_else(|| NONE.to_string()),
            action: analysis.action.clone(),
            target_field: analysis.target_field.clone(),
            source_field: analysis.source_field.clone().unwrap_or_else(|| NONE.to_string()),
            field_inventory: prompts::field_inventory(all_fields),
            event_types: prompts::event_types(),
            action_types: prompts::action_types(),
        })?;
        let completion = self.ask("event", prompt).await?;

        let event = match parse::parse_event_config(&completion) {
            Ok(event) => event,
            Err(err) if self.settings.policy.event == FragmentPolicy::Fallback => {
                tracing::warn!(error = %err, "Event completion unusable, using analysis fallback");
                let hints = parse_description(&analysis.action, all_fields);
                fallback::fallback_event(
                    EventType::from(analysis.event_type.as_str()),
                    ActionType::from(hints.action_type.unwrap_or("setValue")),
                    Some(&analysis.target_field),
                    analysis.condition.clone(),
                    Some(analysis.description.clone()).filter(|d| !d.is_empty()),
                )
            }
            Err(err) => return Err(err),
        };

        let outcome = EventOutcome::from_validation(event, all_fields);
        if let EventOutcome::Invalid { report, .. } = &outcome {
            tracing::warn!(errors = ?report.errors, "Generated event failed validation");
        }
        Ok(outcome)
    }

    /// Stage 2, validation fragment
    pub async fn generate_validation_config(
        &self,
        analysis: &ValidationAnalysis,
        target_field: &str,
        all_fields: &[FieldConfig],
    ) -> GenerationResult<Vec<ValidationRule>> {
        let rule_descriptors = serde_json::to_string_pretty(&analysis.rules)
            .map_err(|e| GenerationError::Template(e.to_string()))?;
        let prompt = self.prompts.render(&ValidationConfigPrompt {
            target_field: target_field.to_string(),
            analysis_description: analysis.description.clone(),
            rule_descriptors,
            field_inventory: prompts::field_inventory(all_fields),
        })?;
        let completion = self.ask("validation", prompt).await?;

        match parse::parse_validation_config(&completion) {
            Ok(rules) => Ok(rules),
            Err(err) if self.settings.policy.validation == FragmentPolicy::Fallback => {
                tracing::warn!(error = %err, target_field, "Validation completion unusable, synthesizing rules");
                Ok(synthesize_rules(analysis))
            }
            Err(err) => Err(err),
        }
    }

    /// Stage 2, component config fragment
    pub async fn generate_component_config(
        &self,
        analysis: &ComponentConfigAnalysis,
        target_field: &str,
        all_fields: &[FieldConfig],
    ) -> GenerationResult<ComponentConfig> {
        let field_type = all_fields
            .iter()
            .find(|f| f.field_name == target_field)
            .map_or("unknown", |f| f.field_type.as_str());
        let prompt = self.prompts.render(&ComponentConfigPrompt {
            target_field: target_field.to_string(),
            field_type: field_type.to_string(),
            analysis_description: analysis.description.clone(),
            proposed_config: analysis.config.to_string(),
            field_inventory: prompts::field_inventory(all_fields),
        })?;
        let completion = self.ask("component_config", prompt).await?;

        match parse::parse_component_config(&completion) {
            Ok(config) => Ok(config),
            Err(err) if self.settings.policy.component_config == FragmentPolicy::Fallback => {
                tracing::warn!(error = %err, target_field, "Component config completion unusable, keeping analysis config");
                Ok(ComponentConfig::from_json(&analysis.config).unwrap_or_default())
            }
            Err(err) => Err(err),
        }
    }

    /// Stage 3, plain-language summary of an event
    pub async fn generate_natural_description(
        &self,
        event: &FieldEvent,
        target_field: &str,
        all_fields: &[FieldConfig],
    ) -> GenerationResult<String> {
        let target_label = all_fields
            .iter()
            .find(|f| f.field_name == target_field)
            .map_or(target_field, |f| f.field_label.as_str());

        let result = async {
            let prompt = self.prompts.render(&DescriptionPrompt {
                target_label: target_label.to_string(),
                target_field: target_field.to_string(),
                event_json: prompts::event_json(event),
            })?;
            let completion = self.ask("description", prompt).await?;
            Ok::<_, GenerationError>(parse_natural_description(&completion))
        }
        .await;

        match result {
            Ok(description) => Ok(description),
            Err(err) if self.settings.policy.description == FragmentPolicy::Fallback => {
                tracing::warn!(error = %err, "Description generation failed, using fixed phrasing");
                Ok(fallback_description(&event.event_type, event.primary_action()))
            }
            Err(err) => Err(err),
        }
    }

    /// Render the single-shot prompt for a request
    pub fn build_direct_prompt(&self, info: &EventKeyInfo) -> GenerationResult<String> {
        self.prompts.render(&DirectEventPrompt {
            description: info.description.clone(),
            field_list: prompts::field_list(&info.available_fields),
            event_types: info.supported_events.join(", "),
            action_types: info.supported_actions.join(", "),
        })
    }

    /// Generate an event in one completion, skipping intent analysis.
    ///
    /// The prompt lists the selected fields; the result is validated against
    /// the whole form, like the staged pipeline.
    pub async fn generate_event_direct(
        &self,
        request: &GenerationRequest,
    ) -> GenerationResult<EventOutcome> {
        let info = extract_key_info(&request.selected_fields, &request.description);
        if info.description.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "description is empty".to_string(),
            ));
        }
        tracing::info!(
            fields = request.selected_fields.len(),
            form_fields = request.all_fields.len(),
            "Generating event directly"
        );

        let prompt = self.build_direct_prompt(&info)?;
        let completion = self.ask("direct_event", prompt).await?;

        let event = match parse::parse_event_config(&completion) {
            Ok(event) => event,
            Err(err) if self.settings.policy.event == FragmentPolicy::Fallback => {
                tracing::warn!(error = %err, "Direct event completion unusable, using keyword hints");
                let hints = parse_description(&request.description, &request.all_fields);
                fallback::fallback_event(
                    EventType::from(hints.event_type.unwrap_or("change")),
                    ActionType::from(hints.action_type.unwrap_or("setValue")),
                    hints.mentioned_fields.last().map(String::as_str),
                    None,
                    Some(info.description.clone()),
                )
            }
            Err(err) => return Err(err),
        };

        Ok(EventOutcome::from_validation(event, &request.all_fields))
    }

    /// Run intent analysis and every requested fragment stage.
    ///
    /// Each fragment's target field is the first of: the section's
    /// `recommendedTargetField`, the event analysis `targetField`, the first
    /// selected field. Candidates that are not form fields are skipped.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<GeneratedFragments> {
        if request.selected_fields.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "no fields selected".to_string(),
            ));
        }
        let categories = if request.categories.is_empty() {
            self.settings.default_categories.clone()
        } else {
            request.categories.clone()
        };

        let analysis = self
            .analyze_enhanced_intent(&request.description, &request.selected_fields, &categories)
            .await?;

        let analysis_target = analysis
            .event_analysis
            .as_ref()
            .map(|e| e.target_field.as_str());

        let event = match &analysis.event_analysis {
            Some(event_analysis) => {
                let target_field = self.resolve_target(
                    request,
                    &[event_analysis.recommended_target_field.as_deref(), analysis_target],
                );
                let outcome = self
                    .generate_event_config(event_analysis, &request.all_fields)
                    .await?;
                let natural_description = if request.describe || self.settings.describe_events {
                    Some(
                        self.generate_natural_description(
                            outcome.event(),
                            &target_field,
                            &request.all_fields,
                        )
                        .await?,
                    )
                } else {
                    None
                };
                Some(EventFragment {
                    target_field,
                    outcome,
                    natural_description,
                })
            }
            None => None,
        };

        let validation = match analysis.active_validation() {
            Some(validation_analysis) => {
                let target_field = self.resolve_target(
                    request,
                    &[validation_analysis.recommended_target_field.as_deref(), analysis_target],
                );
                let rules = self
                    .generate_validation_config(validation_analysis, &target_field, &request.all_fields)
                    .await?;
                Some(ValidationFragment { target_field, rules })
            }
            None => None,
        };

        let component_config = match analysis.active_component_config() {
            Some(config_analysis) => {
                let target_field = self.resolve_target(
                    request,
                    &[config_analysis.recommended_target_field.as_deref(), analysis_target],
                );
                let config = self
                    .generate_component_config(config_analysis, &target_field, &request.all_fields)
                    .await?;
                Some(ComponentConfigFragment { target_field, config })
            }
            None => None,
        };

        Ok(GeneratedFragments {
            analysis,
            event,
            validation,
            component_config,
        })
    }

    fn resolve_target(&self, request: &GenerationRequest, candidates: &[Option<&str>]) -> String {
        candidates
            .iter()
            .flatten()
            .find(|name| request.all_fields.iter().any(|f| f.field_name == **name))
            .map(|name| name.to_string())
            .unwrap_or_else(|| request.selected_fields[0].field_name.clone())
    }

    /// Check an event against a set of fields
    pub fn validate_event_config(&self, event: &FieldEvent, fields: &[FieldConfig]) -> ValidationReport {
        validate_event_config(event, fields)
    }
}
