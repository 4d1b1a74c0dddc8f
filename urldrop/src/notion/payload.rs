//! Request body for Notion's create-page endpoint.
//!
//! Only the shapes this service sends are modelled: a database parent, title / url / rich-text /
//! multi-select properties, and paragraph blocks.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::models::submissions::Submission;
use crate::config::NotionProperties;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCreateRequest {
    pub parent: Parent,
    pub properties: BTreeMap<String, PropertyValue>,
    /// Page body. Empty unless the submission carried notes.
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    pub database_id: String,
}

/// A single property value, serialized as `{ "<kind>": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    Url(String),
    RichText(Vec<RichText>),
    MultiSelect(Vec<SelectOption>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent { content: content.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub paragraph: Paragraph,
}

impl Block {
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: "paragraph",
            paragraph: Paragraph {
                rich_text: vec![RichText::text(content)],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

impl PageCreateRequest {
    /// Build the create-page body for `submission` under database `database_id`.
    ///
    /// Optional properties and the body block only appear when the submission has something to
    /// put in them.
    pub fn build(submission: &Submission, database_id: &str, names: &NotionProperties) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(names.title.clone(), PropertyValue::Title(vec![RichText::text(&submission.title)]));
        properties.insert(names.url.clone(), PropertyValue::Url(submission.url.clone()));

        if !submission.categories.is_empty() {
            let options = submission
                .categories
                .iter()
                .map(|name| SelectOption { name: name.clone() })
                .collect();
            properties.insert(names.category.clone(), PropertyValue::MultiSelect(options));
        }

        let mut children = Vec::new();
        if let Some(notes) = &submission.notes {
            properties.insert(names.notes.clone(), PropertyValue::RichText(vec![RichText::text(notes)]));
            children.push(Block::paragraph(notes));
        }

        Self {
            parent: Parent {
                database_id: database_id.to_string(),
            },
            properties,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::submissions::MAX_TEXT_CHARS;
    use serde_json::{Value, json};

    fn build(body: Value) -> Value {
        let submission = Submission::from_json(&body).unwrap();
        let request = PageCreateRequest::build(&submission, "db-1", &NotionProperties::default());
        serde_json::to_value(request).unwrap()
    }

    #[test]
    fn test_url_only_payload() {
        let payload = build(json!({ "url": "https://example.com" }));

        assert_eq!(
            payload,
            json!({
                "parent": { "database_id": "db-1" },
                "properties": {
                    "Title": { "title": [{ "type": "text", "text": { "content": "https://example.com" } }] },
                    "URL": { "url": "https://example.com" },
                },
                "children": [],
            })
        );
    }

    #[test]
    fn test_notes_fill_property_and_single_paragraph() {
        let notes = "x".repeat(2300);
        let payload = build(json!({ "url": "https://example.com", "notes": notes }));

        let children = payload["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0]["object"], "block");
        assert_eq!(children[0]["type"], "paragraph");

        let block_text = &children[0]["paragraph"]["rich_text"][0]["text"]["content"];
        let property_text = &payload["properties"]["Notes"]["rich_text"][0]["text"]["content"];
        assert_eq!(block_text.as_str().unwrap().chars().count(), MAX_TEXT_CHARS);
        assert_eq!(block_text, property_text);
    }

    #[test]
    fn test_blank_notes_add_nothing() {
        let payload = build(json!({ "url": "https://example.com", "notes": "   " }));

        assert!(payload["properties"].get("Notes").is_none());
        assert_eq!(payload["children"], json!([]));
    }

    #[test]
    fn test_categories_become_multi_select_in_order() {
        let payload = build(json!({ "url": "https://example.com", "category": ["b", " a ", "b"] }));

        assert_eq!(
            payload["properties"]["Category"],
            json!({ "multi_select": [{ "name": "b" }, { "name": "a" }, { "name": "b" }] })
        );
    }

    #[test]
    fn test_all_blank_categories_add_no_property() {
        let payload = build(json!({ "url": "https://example.com", "category": ["", "  "] }));
        assert!(payload["properties"].get("Category").is_none());
    }

    #[test]
    fn test_custom_property_names() {
        let submission = Submission::from_json(&json!({ "url": "https://example.com", "title": "Docs" })).unwrap();
        let names = NotionProperties {
            title: "Name".to_string(),
            url: "Link".to_string(),
            ..Default::default()
        };
        let payload = serde_json::to_value(PageCreateRequest::build(&submission, "db-2", &names)).unwrap();

        assert_eq!(payload["properties"]["Name"]["title"][0]["text"]["content"], "Docs");
        assert_eq!(payload["properties"]["Link"]["url"], "https://example.com");
        assert_eq!(payload["parent"]["database_id"], "db-2");
    }
}
