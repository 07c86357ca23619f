// src/body.rs
//! Page body construction — one pure builder per format variant.
//!
//! A builder maps (format-specific field bag, first block chunk) to the
//! page-creation payload: parent database reference, a property map, and
//! `children`. Properties are built as JSON values because the remote
//! property representation is the contract here, not an internal model.

use crate::config::{CustomPropertyKind, DatabaseTarget};
use crate::model::Block;
use crate::types::DatabaseId;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Parent reference of a page-creation body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parent {
    pub database_id: DatabaseId,
}

/// External cover image reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalCover {
    #[serde(rename = "type")]
    pub cover_type: &'static str,
    pub external: ExternalUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalUrl {
    pub url: String,
}

impl ExternalCover {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            cover_type: "external",
            external: ExternalUrl { url: url.into() },
        }
    }
}

/// A complete page-creation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBody {
    pub parent: Parent,
    pub properties: Map<String, Value>,
    pub children: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<ExternalCover>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
}

impl PageBody {
    fn new(database_id: DatabaseId, properties: Map<String, Value>, children: Vec<Block>) -> Self {
        Self {
            parent: Parent { database_id },
            properties,
            children,
            cover: None,
            icon: None,
        }
    }

    /// Applies the resolved cover URL, falling back to the configured
    /// default banner when no cover was resolved. No-op when neither
    /// exists.
    pub fn apply_cover(&mut self, cover: Option<&str>, default_banner: &str) {
        match cover {
            Some(url) if !url.is_empty() => self.cover = Some(ExternalCover::new(url)),
            _ if self.cover.is_none() && !default_banner.is_empty() => {
                self.cover = Some(ExternalCover::new(default_banner));
            }
            _ => {}
        }
        log::debug!(
            "Cover applied to payload: {:?}",
            self.cover.as_ref().map(|c| c.external.url.as_str())
        );
    }
}

/// Field bag for the general format.
#[derive(Debug, Clone, Default)]
pub struct GeneralFields {
    pub title: String,
    pub tags: Vec<String>,
}

/// Field bag for the NotionNext format.
#[derive(Debug, Clone, Default)]
pub struct NextFields {
    pub title: String,
    pub emoji: String,
    pub tags: Vec<String>,
    pub page_type: String,
    pub slug: String,
    pub status: String,
    pub category: String,
    pub summary: String,
    pub password: String,
    pub favicon: String,
    pub datetime: String,
}

/// Builds a general-format body: title (under the configured property
/// name) plus an optional multi-select tags property.
pub fn build_general_body(
    target: &DatabaseTarget,
    database_id: DatabaseId,
    fields: &GeneralFields,
    first_chunk: Vec<Block>,
) -> PageBody {
    let mut properties = Map::new();
    properties.insert(
        target.title_property_name().to_string(),
        title_value(&fields.title),
    );
    if target.enable_tags {
        properties.insert(
            "tags".to_string(),
            json!({
                "multi_select": fields.tags.iter().map(|t| json!({ "name": t })).collect::<Vec<_>>()
            }),
        );
    }

    PageBody::new(database_id, properties, first_chunk)
}

/// Builds a NotionNext-format body with the fixed blog property set.
pub fn build_next_body(
    database_id: DatabaseId,
    fields: &NextFields,
    first_chunk: Vec<Block>,
) -> PageBody {
    let mut properties = Map::new();
    properties.insert("title".to_string(), title_value(&fields.title));
    properties.insert(
        "type".to_string(),
        json!({ "select": { "name": non_empty_or(&fields.page_type, "Post") } }),
    );
    properties.insert(
        "status".to_string(),
        json!({ "select": { "name": non_empty_or(&fields.status, "Draft") } }),
    );
    properties.insert(
        "category".to_string(),
        json!({ "select": { "name": non_empty_or(&fields.category, "Obsidian") } }),
    );
    properties.insert("password".to_string(), rich_text_value(&fields.password));
    properties.insert("icon".to_string(), rich_text_value(&fields.favicon));
    properties.insert(
        "date".to_string(),
        json!({ "date": { "start": non_empty_or(&fields.datetime, &now_iso8601()) } }),
    );

    if !fields.tags.is_empty() {
        properties.insert(
            "tags".to_string(),
            json!({
                "multi_select": fields.tags.iter().map(|t| json!({ "name": t })).collect::<Vec<_>>()
            }),
        );
    }
    if !fields.slug.is_empty() {
        properties.insert("slug".to_string(), rich_text_value(&fields.slug));
    }
    if !fields.summary.is_empty() {
        properties.insert("summary".to_string(), rich_text_value(&fields.summary));
    }

    let mut body = PageBody::new(database_id, properties, first_chunk);
    // A top-level emoji icon rides outside the property map.
    if !fields.emoji.is_empty() {
        body.icon = Some(json!({ "emoji": fields.emoji }));
    }
    body
}

/// Builds a custom-format body by walking the target's ordered property
/// definitions. Definitions whose name has no value in `values` are
/// omitted entirely, as are definitions with unsupported type tags.
pub fn build_custom_body(
    target: &DatabaseTarget,
    database_id: DatabaseId,
    values: &Map<String, Value>,
    first_chunk: Vec<Block>,
) -> PageBody {
    let mut properties = Map::new();

    for definition in &target.custom_properties {
        let Some(value) = values.get(&definition.name) else {
            continue;
        };
        if let Some(rendered) = custom_property_value(definition.kind, value) {
            properties.insert(definition.name.clone(), rendered);
        }
    }

    PageBody::new(database_id, properties, first_chunk)
}

/// Translates one (value, declared type) pair into its remote property
/// representation. `None` means the property is omitted.
pub fn custom_property_value(kind: CustomPropertyKind, value: &Value) -> Option<Value> {
    match kind {
        CustomPropertyKind::Title => Some(title_value(&value_to_string(value))),
        CustomPropertyKind::RichText => Some(rich_text_value(&value_to_string(value))),
        CustomPropertyKind::Date => {
            let start = match value.as_str() {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => now_iso8601(),
            };
            Some(json!({ "date": { "start": start } }))
        }
        CustomPropertyKind::Number => Some(json!({ "number": value_to_number(value) })),
        CustomPropertyKind::PhoneNumber => Some(json!({ "phone_number": value })),
        CustomPropertyKind::Email => Some(json!({ "email": value })),
        CustomPropertyKind::Url => Some(json!({ "url": value })),
        CustomPropertyKind::Files => {
            let file = |entry: &Value| {
                let url = value_to_string(entry);
                json!({
                    "name": url,
                    "type": "external",
                    "external": { "url": url }
                })
            };
            let files = match value.as_array() {
                Some(entries) => entries.iter().map(file).collect::<Vec<_>>(),
                None => vec![file(value)],
            };
            Some(json!({ "files": files }))
        }
        CustomPropertyKind::Checkbox => Some(json!({ "checkbox": value_is_truthy(value) })),
        CustomPropertyKind::Select => {
            Some(json!({ "select": { "name": value_to_string(value) } }))
        }
        CustomPropertyKind::MultiSelect => {
            let options = match value.as_array() {
                Some(entries) => entries
                    .iter()
                    .map(|e| json!({ "name": value_to_string(e) }))
                    .collect::<Vec<_>>(),
                None => vec![json!({ "name": value_to_string(value) })],
            };
            Some(json!({ "multi_select": options }))
        }
        CustomPropertyKind::Relation => {
            let relations = match value.as_array() {
                Some(entries) => entries
                    .iter()
                    .map(|e| json!({ "id": value_to_string(e) }))
                    .collect::<Vec<_>>(),
                None => vec![json!({ "id": value_to_string(value) })],
            };
            Some(json!({ "relation": relations }))
        }
        CustomPropertyKind::Unsupported => None,
    }
}

fn title_value(title: &str) -> Value {
    json!({ "title": [ { "text": { "content": title } } ] })
}

fn rich_text_value(content: &str) -> Value {
    json!({ "rich_text": [ { "text": { "content": content } } ] })
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Front-matter values arrive as arbitrary YAML scalars; property
/// content wants strings.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn value_to_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// JavaScript-style truthiness, which is what checkbox casting follows:
/// absent, null, false, 0, and "" are false; everything else is true.
fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
