//! Form configuration schema
//!
//! Pure data: forms, fields, data sources, events and the intent-analysis
//! records exchanged with the generation pipeline. Field names use the
//! camelCase wire format the form renderer consumes.

pub mod component;
pub mod data_source;
pub mod event;
pub mod form;
pub mod intent;

pub use component::{ComponentConfig, ConfigValue};
pub use data_source::{
    ApiSource, ComputedSource, DataSource, HttpMethod, OptionItem, ResponseMapping,
    SourceOptions, StaticSource, SEARCH_KEYWORD_PLACEHOLDER,
};
pub use event::{
    ActionType, ApiConfig, EventAction, EventType, EventVocabulary, FieldEvent, EVENT_VOCABULARY,
};
pub use form::{
    FieldConfig, FieldLayout, FieldType, FieldValidation, FormConfig, FormLayout, FormSize,
    FormValidationOptions, LabelPosition, LabelWidth, ValidationRule,
};
pub use intent::{
    AnalysisCategory, ComponentConfigAnalysis, EnhancedIntentAnalysis, EventAnalysis,
    IntentAnalysis, RuleDescriptor, RuleKind, ValidationAnalysis,
};
