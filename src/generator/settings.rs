//! Tunables for the generation pipeline

use serde::{Deserialize, Serialize};

use crate::domain::AnalysisCategory;

/// What to do when a fragment completion cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentPolicy {
    /// Surface the error to the caller
    Fail,
    /// Substitute the deterministic fallback and log a warning
    Fallback,
}

/// Per-category fragment policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySettings {
    #[serde(default = "default_event_policy")]
    pub event: FragmentPolicy,
    #[serde(default = "default_fallback_policy")]
    pub validation: FragmentPolicy,
    #[serde(default = "default_fallback_policy")]
    pub component_config: FragmentPolicy,
    #[serde(default = "default_fallback_policy")]
    pub description: FragmentPolicy,
}

fn default_event_policy() -> FragmentPolicy {
    FragmentPolicy::Fail
}

fn default_fallback_policy() -> FragmentPolicy {
    FragmentPolicy::Fallback
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            event: default_event_policy(),
            validation: default_fallback_policy(),
            component_config: default_fallback_policy(),
            description: default_fallback_policy(),
        }
    }
}

/// `[generation]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Categories analysed when a request names none
    #[serde(default = "default_categories")]
    pub default_categories: Vec<AnalysisCategory>,
    /// Also produce a plain-language summary of generated events
    #[serde(default)]
    pub describe_events: bool,
    #[serde(default)]
    pub policy: PolicySettings,
}

fn default_categories() -> Vec<AnalysisCategory> {
    AnalysisCategory::ALL.to_vec()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_categories: default_categories(),
            describe_events: false,
            policy: PolicySettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let policy = PolicySettings::default();
        assert_eq!(policy.event, FragmentPolicy::Fail);
        assert_eq!(policy.validation, FragmentPolicy::Fallback);
        assert_eq!(policy.component_config, FragmentPolicy::Fallback);
        assert_eq!(policy.description, FragmentPolicy::Fallback);
    }

    #[test]
    fn test_partial_policy_table() {
        let settings: GenerationSettings = toml::from_str(
            r#"
describe_events = true

[policy]
validation = "fail"
"#,
        )
        .unwrap();
        assert!(settings.describe_events);
        assert_eq!(settings.policy.validation, FragmentPolicy::Fail);
        assert_eq!(settings.policy.event, FragmentPolicy::Fail);
        assert_eq!(settings.default_categories.len(), 3);
    }
}
