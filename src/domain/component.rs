//! Open component configuration maps
//!
//! UI components accept an extensible set of options per field type, so the
//! configuration is a key → value map rather than a fixed record. A handful of
//! well-known keys get typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Value stored in a component config or `customData` map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ConfigValue>),
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Convert arbitrary JSON, dropping nulls (at any depth)
    pub fn from_json(value: &Value) -> Option<ConfigValue> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(ConfigValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(ConfigValue::Integer(i)),
                None => n.as_f64().map(ConfigValue::Float),
            },
            Value::String(s) => Some(ConfigValue::Text(s.clone())),
            Value::Array(items) => Some(ConfigValue::List(
                items.iter().filter_map(ConfigValue::from_json).collect(),
            )),
            Value::Object(map) => Some(ConfigValue::Map(
                map.iter()
                    .filter_map(|(k, v)| ConfigValue::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

/// Per-field UI component options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentConfig(pub BTreeMap<String, ConfigValue>);

impl ComponentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; anything else yields `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self(
            map.iter()
                .filter_map(|(k, v)| ConfigValue::from_json(v).map(|v| (k.clone(), v)))
                .collect(),
        ))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.get("placeholder").and_then(ConfigValue::as_str)
    }

    pub fn clearable(&self) -> Option<bool> {
        self.get("clearable").and_then(ConfigValue::as_bool)
    }

    pub fn filterable(&self) -> Option<bool> {
        self.get("filterable").and_then(ConfigValue::as_bool)
    }

    pub fn multiple(&self) -> Option<bool> {
        self.get("multiple").and_then(ConfigValue::as_bool)
    }

    pub fn min(&self) -> Option<f64> {
        self.get("min").and_then(ConfigValue::as_f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.get("max").and_then(ConfigValue::as_f64)
    }

    pub fn precision(&self) -> Option<f64> {
        self.get("precision").and_then(ConfigValue::as_f64)
    }

    pub fn format(&self) -> Option<&str> {
        self.get("format").and_then(ConfigValue::as_str)
    }

    /// Compact JSON rendering used in prompt field inventories
    pub fn to_compact_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
