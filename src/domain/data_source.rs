//! Where a field's selectable options come from

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder token in api params, replaced with the user's search text
pub const SEARCH_KEYWORD_PLACEHOLDER: &str = "{searchKeyword}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Options shared by every data source kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    /// Cache lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u64>,
}

/// A selectable option. Extra keys feed linked-field auto-fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: Value,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OptionItem {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// How a response item maps onto an option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMapping {
    pub value: String,
    pub label: String,
    /// option key → response item key, copied onto every option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<BTreeMap<String, String>>,
}

impl ResponseMapping {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            custom_data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSource {
    #[serde(default)]
    pub options: Vec<OptionItem>,
    #[serde(flatten)]
    pub common: SourceOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSource {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Dot-path to the option array inside the response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mapping: Option<ResponseMapping>,
    #[serde(default)]
    pub is_searchable: bool,
    #[serde(flatten)]
    pub common: SourceOptions,
}

impl ApiSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            params: None,
            headers: None,
            data_path: None,
            response_mapping: None,
            is_searchable: false,
            common: SourceOptions::default(),
        }
    }

    /// Params with every `{searchKeyword}` occurrence replaced by `keyword`
    pub fn params_for(&self, keyword: &str) -> BTreeMap<String, Value> {
        self.params
            .iter()
            .flatten()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => {
                        Value::String(s.replace(SEARCH_KEYWORD_PLACEHOLDER, keyword))
                    }
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect()
    }

    /// Walk `data_path` and map each item through `response_mapping`.
    ///
    /// Items missing the value or label key are skipped. Without a mapping the
    /// items are read as `{value, label}` objects directly.
    pub fn map_response(&self, body: &Value) -> Vec<OptionItem> {
        let items = match self.data_path.as_deref() {
            Some(path) if !path.is_empty() => resolve_path(body, path),
            _ => Some(body),
        };
        let Some(Value::Array(items)) = items else {
            return Vec::new();
        };

        let default_mapping = ResponseMapping::new("value", "label");
        let mapping = self.response_mapping.as_ref().unwrap_or(&default_mapping);

        items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let value = obj.get(&mapping.value)?.clone();
                let label = label_text(obj.get(&mapping.label)?);
                let mut option = OptionItem::new(value, label);
                if let Some(custom) = &mapping.custom_data {
                    for (option_key, item_key) in custom {
                        if let Some(v) = obj.get(item_key) {
                            option.extra.insert(option_key.clone(), v.clone());
                        }
                    }
                }
                Some(option)
            })
            .collect()
    }

    /// Searchable sources must declare params and customData
    pub fn searchable_violations(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.is_searchable {
            return missing;
        }
        if self.params.as_ref().map_or(true, |p| p.is_empty()) {
            missing.push("params");
        }
        let has_custom = self
            .response_mapping
            .as_ref()
            .and_then(|m| m.custom_data.as_ref())
            .map_or(false, |c| !c.is_empty());
        if !has_custom {
            missing.push("responseMapping.customData");
        }
        missing
    }
}

fn resolve_path<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(body, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedSource {
    /// Evaluated by the caller against current form data
    pub expression: String,
    #[serde(flatten)]
    pub common: SourceOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataSource {
    Static(StaticSource),
    Api(ApiSource),
    Computed(ComputedSource),
}

impl DataSource {
    pub fn static_options(options: Vec<OptionItem>) -> Self {
        DataSource::Static(StaticSource {
            options,
            common: SourceOptions::default(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Static(_) => "static",
            DataSource::Api(_) => "api",
            DataSource::Computed(_) => "computed",
        }
    }

    pub fn as_api(&self) -> Option<&ApiSource> {
        match self {
            DataSource::Api(api) => Some(api),
            _ => None,
        }
    }
}

/// Shorthand used by builders that assemble header maps
pub(crate) fn string_map<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Same as [`string_map`] for JSON-valued maps
pub(crate) fn value_map<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}
