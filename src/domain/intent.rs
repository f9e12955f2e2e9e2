//! Intent analysis results produced by the first generation stage

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Basic single-category analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub action: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalysis {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub action: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_target_field: Option<String>,
}

impl From<IntentAnalysis> for EventAnalysis {
    fn from(basic: IntentAnalysis) -> Self {
        Self {
            description: basic.action.clone(),
            event_type: basic.event_type,
            condition: basic.condition,
            action: basic.action,
            target_field: basic.target_field,
            source_field: basic.source_field,
            recommended_target_field: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Required,
    Min,
    Max,
    Pattern,
    /// Also receives rule types outside the known set, such as `email`
    #[serde(other)]
    Custom,
}

/// Rule as described by the analysis, before mapping onto the rule schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationAnalysis {
    #[serde(default)]
    pub has_validation: bool,
    #[serde(default)]
    pub rules: Vec<RuleDescriptor>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_target_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfigAnalysis {
    #[serde(default)]
    pub has_config: bool,
    /// Raw config as proposed by the analysis
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_target_field: Option<String>,
}

/// Output of the enhanced analysis step, one optional section per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedIntentAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_analysis: Option<EventAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_analysis: Option<ValidationAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_config_analysis: Option<ComponentConfigAnalysis>,
}

impl EnhancedIntentAnalysis {
    /// Validation section, only when it reports rules to apply
    pub fn active_validation(&self) -> Option<&ValidationAnalysis> {
        self.validation_analysis
            .as_ref()
            .filter(|v| v.has_validation)
    }

    /// Component config section, only when it reports a config to apply
    pub fn active_component_config(&self) -> Option<&ComponentConfigAnalysis> {
        self.component_config_analysis
            .as_ref()
            .filter(|c| c.has_config)
    }
}

/// Analysis category a caller can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisCategory {
    Event,
    Validation,
    ComponentConfig,
}

impl AnalysisCategory {
    pub const ALL: [AnalysisCategory; 3] = [
        AnalysisCategory::Event,
        AnalysisCategory::Validation,
        AnalysisCategory::ComponentConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisCategory::Event => "event",
            AnalysisCategory::Validation => "validation",
            AnalysisCategory::ComponentConfig => "componentConfig",
        }
    }
}

impl fmt::Display for AnalysisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(AnalysisCategory::Event),
            "validation" => Ok(AnalysisCategory::Validation),
            "componentConfig" | "component-config" | "component_config" => {
                Ok(AnalysisCategory::ComponentConfig)
            }
            other => Err(format!("unknown analysis category: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enhanced_sections_are_gated_by_flags() {
        let analysis: EnhancedIntentAnalysis = serde_json::from_value(json!({
            "validationAnalysis": { "hasValidation": false, "rules": [], "description": "" },
            "componentConfigAnalysis": {
                "hasConfig": true,
                "config": { "clearable": true },
                "description": "allow clearing"
            }
        }))
        .unwrap();

        assert!(analysis.event_analysis.is_none());
        assert!(analysis.active_validation().is_none());
        assert_eq!(
            analysis.active_component_config().unwrap().config,
            json!({ "clearable": true })
        );
    }

    #[test]
    fn test_unknown_rule_type_is_custom() {
        let analysis: ValidationAnalysis = serde_json::from_value(json!({
            "hasValidation": true,
            "rules": [{ "type": "email", "message": "Bad email" }, { "type": "required" }]
        }))
        .unwrap();
        assert_eq!(analysis.rules[0].kind, RuleKind::Custom);
        assert_eq!(analysis.rules[1].kind, RuleKind::Required);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("event".parse::<AnalysisCategory>(), Ok(AnalysisCategory::Event));
        assert_eq!(
            "component-config".parse::<AnalysisCategory>(),
            Ok(AnalysisCategory::ComponentConfig)
        );
        assert!("layout".parse::<AnalysisCategory>().is_err());
    }
}
