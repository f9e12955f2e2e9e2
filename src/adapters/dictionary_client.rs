//! Client for the remote dictionary service
//!
//! The service exposes two GET endpoints that answer with a `{code, data}`
//! envelope; only `code == 0` counts as success. Besides fetching, this
//! module builds the `api` data source a form field uses to load one
//! dictionary type's entries at render time.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{CatalogEntry, CatalogField};
use crate::domain::data_source::{string_map, value_map};
use crate::domain::{ApiSource, DataSource, HttpMethod, ResponseMapping};

pub const DEFAULT_BASE_URL: &str = "http://localhost:48125/admin-api/basedata/basequery/common";
pub const DEFAULT_TENANT_ID: &str = "1";
/// Keyword used when listing types without a filter
pub const DEFAULT_TYPE_KEYWORD: &str = "i";

const TYPES_PATH: &str = "listDictTypeInfo";
const DATA_PATH: &str = "listDictData";

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("API error! code: {code}")]
    Api { code: i64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for DictionaryError {
    fn from(err: reqwest::Error) -> Self {
        DictionaryError::Network(err.to_string())
    }
}

pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// `[dictionary]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tenant_id: default_tenant_id(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl DictionaryConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn types_url(&self) -> String {
        self.endpoint(TYPES_PATH)
    }

    pub fn data_url(&self) -> String {
        self.endpoint(DATA_PATH)
    }

    /// `api` source that loads the entries of `dict_type`
    pub fn data_source(&self, dict_type: &str) -> DataSource {
        let mut source = ApiSource::new(self.data_url());
        source.method = HttpMethod::Get;
        source.params = Some(value_map([("keyword", dict_type)]));
        source.headers = Some(string_map([
            ("Accept", "application/json"),
            ("tenant-id", self.tenant_id.as_str()),
        ]));
        source.data_path = Some("data".to_string());
        source.response_mapping = Some(ResponseMapping {
            value: "value".to_string(),
            label: "label".to_string(),
            custom_data: Some(string_map([("label", "label"), ("value", "value")])),
        });
        source.is_searchable = false;
        DataSource::Api(source)
    }

    /// JavaScript function that loads the entries of `dict_type` as
    /// `{label, value}` pairs. It resolves to an empty list on any failure.
    pub fn fetch_snippet(&self, dict_type: &str) -> String {
        let literal = |s: &str| Value::String(s.to_string()).to_string();
        format!(
            r#"// Fetch the {comment} dictionary entries
async function {name}() {{
  try {{
    const params = new URLSearchParams({{ keyword: {keyword} }})
    const response = await fetch({url} + '?' + params, {{
      method: 'GET',
      headers: {{
        'Accept': 'application/json',
        'tenant-id': {tenant}
      }}
    }})

    if (!response.ok) {{
      throw new Error(`HTTP error! status: ${{response.status}}`)
    }}

    const result = await response.json()
    if (result.code !== 0) {{
      throw new Error(`API error! code: ${{result.code}}`)
    }}

    return (result.data || []).map(item => ({{ label: item.label, value: item.value }}))
  }} catch (error) {{
    console.error('Failed to fetch dictionary data:', error)
    return []
  }}
}}
"#,
            comment = dict_type.replace(|c: char| c == '\r' || c == '\n', " "),
            name = format!("fetch{}DictData", pascal_case(dict_type)),
            keyword = literal(dict_type),
            url = literal(&self.data_url()),
            tenant = literal(&self.tenant_id),
        )
    }
}

/// `sys_user-sex` becomes `SysUserSex`; characters outside ASCII
/// alphanumerics only separate words
fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let (first, rest) = word.split_at(1);
            format!("{}{}", first.to_ascii_uppercase(), rest)
        })
        .collect()
}

/// A dictionary type as listed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictType {
    pub name: String,
    #[serde(rename = "type")]
    pub dict_type: String,
    #[serde(default)]
    pub labels: String,
}

/// One entry of a dictionary type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictData {
    pub label: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Data source for a dictionary type against the default service.
///
/// The mapping is always `{value: "value", label: "label"}`; `dict_name` only
/// names the source and does not change it.
pub fn build_data_source(dict_type: &str, dict_name: &str) -> DataSource {
    tracing::trace!(dict_type, dict_name, "Building dictionary data source");
    DictionaryConfig::default().data_source(dict_type)
}

/// Catalog entry wrapping the dictionary data source
pub fn dictionary_catalog_entry(config: &DictionaryConfig, dict_type: &str, dict_name: &str) -> CatalogEntry {
    let source = match config.data_source(dict_type) {
        DataSource::Api(api) => Some(api),
        _ => None,
    };
    CatalogEntry {
        id: format!("dict-{}", dict_type),
        name: format!("{} dictionary", dict_name),
        description: format!("Dictionary entries for {}", dict_name),
        url: config.data_url(),
        fields: vec![
            CatalogField {
                key: "label".to_string(),
                label: "Label".to_string(),
                field_type: "string".to_string(),
            },
            CatalogField {
                key: "value".to_string(),
                label: "Value".to_string(),
                field_type: "string".to_string(),
            },
        ],
        source,
    }
}

pub struct DictionaryClient {
    client: reqwest::Client,
    config: DictionaryConfig,
}

impl DictionaryClient {
    pub fn new(config: DictionaryConfig) -> DictionaryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// List dictionary types matching `keyword`
    pub async fn fetch_types(&self, keyword: &str) -> DictionaryResult<Vec<DictType>> {
        self.fetch(&self.config.types_url(), keyword).await
    }

    /// List the entries of the dictionary type `keyword`
    pub async fn fetch_data(&self, keyword: &str) -> DictionaryResult<Vec<DictData>> {
        self.fetch(&self.config.data_url(), keyword).await
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        keyword: &str,
    ) -> DictionaryResult<Vec<T>> {
        tracing::debug!(url, keyword, "Querying dictionary service");

        let response = self
            .client
            .get(url)
            .query(&[("keyword", keyword)])
            .header("Accept", "application/json")
            .header("tenant-id", &self.config.tenant_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Dictionary request failed");
            return Err(DictionaryError::Http {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DictionaryError::Parse(e.to_string()))?;
        decode_envelope(body)
    }
}

/// Check `code` and decode `data`; a missing or null `data` is an empty list
fn decode_envelope<T: for<'de> Deserialize<'de>>(body: Value) -> DictionaryResult<Vec<T>> {
    let code = body
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| DictionaryError::Parse("response has no numeric code".to_string()))?;
    if code != 0 {
        tracing::warn!(code, "Dictionary service returned an error code");
        return Err(DictionaryError::Api { code });
    }

    match body.get("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => serde_json::from_value(data.clone())
            .map_err(|e| DictionaryError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_build_data_source_is_deterministic() {
        let first = build_data_source("region", "地区");
        assert_eq!(first, build_data_source("region", "地区"));

        let api = first.as_api().unwrap();
        assert_eq!(
            api.url,
            "http://localhost:48125/admin-api/basedata/basequery/common/listDictData"
        );
        assert_eq!(api.method, HttpMethod::Get);
        assert_eq!(api.params.as_ref().unwrap()["keyword"], json!("region"));
        let headers = api.headers.as_ref().unwrap();
        assert_eq!(headers["tenant-id"], "1");
        assert_eq!(headers["Accept"], "application/json");
        assert_eq!(api.data_path.as_deref(), Some("data"));
        let mapping = api.response_mapping.as_ref().unwrap();
        assert_eq!(mapping.value, "value");
        assert_eq!(mapping.label, "label");
        assert!(!api.is_searchable);
    }

    #[test]
    fn test_mapping_ignores_arguments() {
        let a = build_data_source("region", "地区");
        let b = build_data_source("gender", "Gender");
        assert_eq!(
            a.as_api().unwrap().response_mapping,
            b.as_api().unwrap().response_mapping
        );
    }

    #[test]
    fn test_catalog_entry() {
        let entry = dictionary_catalog_entry(&DictionaryConfig::default(), "region", "Region");
        assert_eq!(entry.id, "dict-region");
        assert_eq!(entry.name, "Region dictionary");
        assert_eq!(entry.data_source(), build_data_source("region", "Region"));
    }

    #[test]
    fn test_fetch_snippet() {
        let config = DictionaryConfig {
            base_url: "http://dict.local/common/".to_string(),
            tenant_id: "7".to_string(),
            timeout_seconds: 5,
        };
        let snippet = config.fetch_snippet("sys_user_sex");

        assert!(snippet.starts_with("// Fetch the sys_user_sex dictionary entries\n"));
        assert!(snippet.contains("async function fetchSysUserSexDictData() {"));
        assert!(snippet.contains(r#"new URLSearchParams({ keyword: "sys_user_sex" })"#));
        assert!(snippet.contains(r#"fetch("http://dict.local/common/listDictData" + '?' + params"#));
        assert!(snippet.contains(r#"'tenant-id': "7""#));
        assert!(snippet.contains("if (result.code !== 0) {"));
        assert!(snippet.contains("status: ${response.status}"));
        assert!(snippet.contains("return []"));
    }

    #[test]
    fn test_snippet_names_and_quoting() {
        assert_eq!(pascal_case("region"), "Region");
        assert_eq!(pascal_case("order-status.v2"), "OrderStatusV2");
        assert_eq!(pascal_case("地区"), "");

        let snippet = DictionaryConfig::default().fetch_snippet("it's");
        assert!(snippet.contains("async function fetchItSDictData()"));
        assert!(snippet.contains(r#"keyword: "it's""#));
    }

    #[test]
    fn test_envelope_decoding() {
        let data: Vec<DictData> = decode_envelope(json!({
            "code": 0,
            "data": [{ "label": "North", "value": "N" }, { "label": "One", "value": 1 }]
        }))
        .unwrap();
        assert_eq!(data[1].value, "1");

        let empty: Vec<DictData> = decode_envelope(json!({ "code": 0 })).unwrap();
        assert!(empty.is_empty());

        let err = decode_envelope::<DictData>(json!({ "code": 1, "data": [] })).unwrap_err();
        assert!(matches!(err, DictionaryError::Api { code: 1 }));
    }
}
