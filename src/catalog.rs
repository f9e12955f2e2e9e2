//! Registry of named remote-lookup definitions
//!
//! Each entry describes an external API that can back a select-style field:
//! where it lives, what fields an item carries and the `api` data source the
//! form renderer should use. Built-in entries come first, followed by any
//! entries loaded from `config/data_sources/`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::data_source::{string_map, value_map};
use crate::domain::{ApiSource, DataSource, ResponseMapping, SEARCH_KEYWORD_PLACEHOLDER};

/// One attribute of the items an endpoint returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl CatalogField {
    fn new(key: &str, label: &str, field_type: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type: field_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub fields: Vec<CatalogField>,
    /// Explicit source; derived from `url` and `fields` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApiSource>,
}

impl CatalogEntry {
    /// The `api` data source a field bound to this entry should use.
    ///
    /// Without an explicit source, the value key is `id` (or the first
    /// field), the label key is `name` (or `label`, or the value key) and
    /// every remaining field is copied into `customData`.
    pub fn data_source(&self) -> DataSource {
        if let Some(source) = &self.source {
            return DataSource::Api(source.clone());
        }

        let has = |key: &str| self.fields.iter().any(|f| f.key == key);
        let first = self.fields.first().map(|f| f.key.as_str());
        let value_key = if has("id") { Some("id") } else { first };
        let label_key = ["name", "label"]
            .into_iter()
            .find(|k| has(*k))
            .or(value_key);

        let mut source = ApiSource::new(&self.url);
        if let (Some(value), Some(label)) = (value_key, label_key) {
            let custom: BTreeMap<String, String> = self
                .fields
                .iter()
                .filter(|f| f.key != value && f.key != label)
                .map(|f| (f.key.clone(), f.key.clone()))
                .collect();
            source.response_mapping = Some(ResponseMapping {
                value: value.to_string(),
                label: label.to_string(),
                custom_data: Some(custom).filter(|c| !c.is_empty()),
            });
        }
        DataSource::Api(source)
    }
}

/// `{value, label}` pair for a catalog picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct DataSourceCatalog {
    entries: Vec<CatalogEntry>,
}

impl DataSourceCatalog {
    /// Catalog holding only the built-in entries
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    /// Built-in entries followed by `extra`, in order
    pub fn with_entries(extra: Vec<CatalogEntry>) -> Self {
        let mut entries = builtin_entries();
        entries.extend(extra);
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Picker options in declaration order
    pub fn list_available(&self) -> Vec<CatalogOption> {
        self.entries
            .iter()
            .map(|e| CatalogOption {
                value: e.id.clone(),
                label: e.name.clone(),
            })
            .collect()
    }

    pub fn lookup(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl Default for DataSourceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn entry(id: &str, name: &str, description: &str, url: &str, fields: Vec<CatalogField>) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        fields,
        source: None,
    }
}

fn builtin_entries() -> Vec<CatalogEntry> {
    let mut products = entry(
        "products-search",
        "Product search API",
        "Search products by name",
        "http://localhost:3000/api/products/search",
        vec![
            CatalogField::new("name", "Product name", "string"),
            CatalogField::new("partNumber", "Part number", "string"),
            CatalogField::new("spec", "Specification", "string"),
        ],
    );
    // Searched by keyword, so params and customData are spelled out
    let mut search = ApiSource::new(&products.url);
    search.params = Some(value_map([("name", SEARCH_KEYWORD_PLACEHOLDER)]));
    search.response_mapping = Some(ResponseMapping {
        value: "name".to_string(),
        label: "name".to_string(),
        custom_data: Some(string_map([("partNumber", "partNumber"), ("spec", "spec")])),
    });
    search.is_searchable = true;
    products.source = Some(search);

    vec![
        products,
        entry(
            "users-list",
            "User list API",
            "List users",
            "http://localhost:3000/api/users",
            vec![
                CatalogField::new("id", "User ID", "number"),
                CatalogField::new("name", "User name", "string"),
                CatalogField::new("email", "Email", "string"),
                CatalogField::new("role", "Role", "string"),
            ],
        ),
        entry(
            "categories-list",
            "Category list API",
            "List product categories",
            "http://localhost:3000/api/categories",
            vec![
                CatalogField::new("id", "Category ID", "number"),
                CatalogField::new("name", "Category name", "string"),
                CatalogField::new("code", "Category code", "string"),
                CatalogField::new("parentId", "Parent category ID", "number"),
            ],
        ),
        entry(
            "departments-list",
            "Department list API",
            "List departments",
            "http://localhost:3000/api/departments",
            vec![
                CatalogField::new("id", "Department ID", "number"),
                CatalogField::new("name", "Department name", "string"),
                CatalogField::new("code", "Department code", "string"),
                CatalogField::new("manager", "Department manager", "string"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_available_in_declaration_order() {
        let ids: Vec<String> = DataSourceCatalog::builtin()
            .list_available()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(
            ids,
            vec!["products-search", "users-list", "categories-list", "departments-list"]
        );
    }

    #[test]
    fn test_lookup() {
        let catalog = DataSourceCatalog::builtin();
        let users = catalog.lookup("users-list").unwrap();
        assert_eq!(users.url, "http://localhost:3000/api/users");
        assert_eq!(users.fields.len(), 4);
        assert!(catalog.lookup("nope").is_none());
    }

    #[test]
    fn test_derived_source_mapping() {
        let catalog = DataSourceCatalog::builtin();
        let source = catalog.lookup("departments-list").unwrap().data_source();
        let api = source.as_api().unwrap();
        let mapping = api.response_mapping.as_ref().unwrap();
        assert_eq!(mapping.value, "id");
        assert_eq!(mapping.label, "name");
        let custom = mapping.custom_data.as_ref().unwrap();
        assert_eq!(custom.keys().collect::<Vec<_>>(), vec!["code", "manager"]);
        assert!(!api.is_searchable);
    }

    #[test]
    fn test_builtin_searchable_source_is_complete() {
        let catalog = DataSourceCatalog::builtin();
        let source = catalog.lookup("products-search").unwrap().data_source();
        let api = source.as_api().unwrap();
        assert!(api.is_searchable);
        assert!(api.searchable_violations().is_empty());
    }

    #[test]
    fn test_extra_entries_follow_builtins() {
        let extra: CatalogEntry = serde_yaml::from_str(
            r#"
id: suppliers-list
name: Supplier list API
url: http://localhost:3000/api/suppliers
fields:
  - { key: code, label: Supplier code, type: string }
  - { key: label, label: Supplier, type: string }
"#,
        )
        .unwrap();
        let catalog = DataSourceCatalog::with_entries(vec![extra]);
        assert_eq!(catalog.list_available().len(), 5);

        let entry = catalog.lookup("suppliers-list").unwrap();
        let source = entry.data_source();
        let mapping = source.as_api().unwrap().response_mapping.clone().unwrap();
        assert_eq!(mapping.value, "code");
        assert_eq!(mapping.label, "label");
        assert!(mapping.custom_data.is_none());
    }
}
