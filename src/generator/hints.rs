//! Offline keyword matching over a user's description

use serde::Serialize;

use crate::domain::{ActionType, FieldConfig, EVENT_VOCABULARY};

type KeywordTable = &'static [(&'static str, &'static [&'static str])];

const EVENT_KEYWORDS: KeywordTable = &[
    (
        "change",
        &["changes", "changed", "select", "selected", "choose", "chosen", "改变", "选择", "变化"],
    ),
    (
        "blur",
        &["loses focus", "lose focus", "leaves", "leaving", "blur", "失去焦点", "离开", "失焦"],
    ),
    ("focus", &["gains focus", "focused", "click", "获得焦点", "聚焦", "点击"]),
    ("input", &["typing", "types", "input", "输入", "键入"]),
];

const ACTION_KEYWORDS: KeywordTable = &[
    (
        "setValue",
        &[
            "set", "sets", "fill", "fills", "equal", "multiply", "multiplies", "add", "adds",
            "subtract", "divide", "设置", "赋值", "等于", "乘以", "加上", "减去", "除以",
        ],
    ),
    ("show", &["show", "shows", "display", "displays", "显示", "展示"]),
    ("hide", &["hide", "hides", "隐藏", "不显示"]),
    ("enable", &["enable", "enables", "启用", "可用"]),
    ("disable", &["disable", "disables", "禁用", "不可用"]),
];

const CONDITION_KEYWORDS: KeywordTable = &[
    ("startsWith", &["starts with", "begins with", "以...开头", "开头是"]),
    ("endsWith", &["ends with", "以...结尾", "结尾是"]),
    ("includes", &["contains", "includes", "包含", "含有"]),
    ("equals", &["equals", "is", "等于", "是"]),
];

/// What a description mentions, found without calling the LLM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionHints {
    pub event_type: Option<&'static str>,
    pub action_type: Option<&'static str>,
    pub condition_type: Option<&'static str>,
    pub mentioned_fields: Vec<String>,
}

/// Match the description against fixed keyword tables.
///
/// Tables are checked in declaration order and the first key with a matching
/// keyword wins. Matching is case-insensitive for ASCII, and ASCII keywords
/// only match whole words, so `add` does not fire on "address". Fields are reported
/// by `fieldName`, first those mentioned by name then those mentioned only
/// by label.
pub fn parse_description(description: &str, fields: &[FieldConfig]) -> DescriptionHints {
    let text = description.to_lowercase();

    let mut mentioned_fields: Vec<String> = fields
        .iter()
        .filter(|f| text.contains(&f.field_name.to_lowercase()))
        .map(|f| f.field_name.clone())
        .collect();
    for field in fields {
        if !field.field_label.is_empty()
            && text.contains(&field.field_label.to_lowercase())
            && !mentioned_fields.contains(&field.field_name)
        {
            mentioned_fields.push(field.field_name.clone());
        }
    }

    DescriptionHints {
        event_type: find_keyword_match(&text, EVENT_KEYWORDS),
        action_type: find_keyword_match(&text, ACTION_KEYWORDS),
        condition_type: find_keyword_match(&text, CONDITION_KEYWORDS),
        mentioned_fields,
    }
}

fn find_keyword_match(text: &str, table: KeywordTable) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_keyword(text, k)))
        .map(|(key, _)| *key)
}

fn contains_keyword(text: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return text.contains(keyword);
    }
    let is_word = |c: Option<char>| c.map_or(false, |c| c.is_ascii_alphanumeric());
    text.match_indices(keyword).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + keyword.len()..].chars().next();
        !is_word(before) && !is_word(after)
    })
}

/// Field summary used by the single-shot prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Everything the single-shot prompt needs from the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKeyInfo {
    pub description: String,
    pub available_fields: Vec<FieldSummary>,
    pub supported_events: Vec<&'static str>,
    pub supported_actions: Vec<&'static str>,
}

pub fn extract_key_info(fields: &[FieldConfig], description: &str) -> EventKeyInfo {
    EventKeyInfo {
        description: description.trim().to_string(),
        available_fields: fields
            .iter()
            .map(|f| FieldSummary {
                name: f.field_name.clone(),
                label: f.field_label.clone(),
                field_type: f.field_type.as_str().to_string(),
            })
            .collect(),
        supported_events: EVENT_VOCABULARY.names(),
        supported_actions: ActionType::ALL.iter().map(|a| a.as_str()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldType;
    use pretty_assertions::assert_eq;

    fn fields() -> Vec<FieldConfig> {
        vec![
            FieldConfig::new("product", FieldType::String, "Product name"),
            FieldConfig::new("price", FieldType::Float, "Unit price"),
            FieldConfig::new("remark", FieldType::Textarea, "备注"),
        ]
    }

    #[test]
    fn test_english_description() {
        let hints = parse_description(
            "When the product starts with bt and loses focus, multiply the unit price by 10",
            &fields(),
        );
        assert_eq!(hints.event_type, Some("blur"));
        assert_eq!(hints.action_type, Some("setValue"));
        assert_eq!(hints.condition_type, Some("startsWith"));
        assert_eq!(hints.mentioned_fields, vec!["product", "price"]);
    }

    #[test]
    fn test_chinese_description() {
        let hints = parse_description("选择类别后隐藏备注", &fields());
        assert_eq!(hints.event_type, Some("change"));
        assert_eq!(hints.action_type, Some("hide"));
        assert_eq!(hints.mentioned_fields, vec!["remark"]);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let hints = parse_description("hide the email address when the form resets", &fields());
        assert_eq!(hints.action_type, Some("hide"));

        let hints = parse_description("the product is chosen, so it sets the price", &fields());
        assert_eq!(hints.event_type, Some("change"));
        assert_eq!(hints.action_type, Some("setValue"));
        assert_eq!(hints.condition_type, Some("equals"));

        assert!(contains_keyword("备注改变时", "改变"));
        assert!(!contains_keyword("this island", "is"));
    }

    #[test]
    fn test_no_matches() {
        let hints = parse_description("nothing relevant", &fields());
        assert_eq!(hints, DescriptionHints::default());
    }

    #[test]
    fn test_key_info_uses_vocabulary() {
        let info = extract_key_info(&fields(), "  double the price  ");
        assert_eq!(info.description, "double the price");
        assert_eq!(info.supported_events, vec!["change", "blur"]);
        assert_eq!(info.supported_actions.len(), 7);
        assert_eq!(info.available_fields[1].field_type, "float");
    }
}
