// src/frontmatter.rs
//! Front-matter extraction and write-back.
//!
//! Front matter is both sync input (cover, tags, custom field values,
//! the remembered remote identifier) and the write-back location for
//! remote linkage. Keys storing remote state are namespaced by target
//! abbreviation: `NotionID-<abName>` and `link-<abName>`, so one note
//! can be pushed to several targets independently.

use crate::config::{CustomPropertyKind, DatabaseTarget};
use crate::error::AppError;
use crate::types::PageId;
use serde_yaml::{Mapping, Value as Yaml};
use std::path::Path;

/// The front-matter key holding the remembered page id for a target.
pub fn notion_id_key(ab_name: &str) -> String {
    format!("NotionID-{}", ab_name)
}

/// The front-matter key holding the shareable link for a target.
pub fn link_key(ab_name: &str) -> String {
    format!("link-{}", ab_name)
}

/// Splits a markdown document into its front-matter mapping and body.
///
/// A document without front matter yields an empty mapping and the full
/// text as body. Malformed YAML raises; a note with broken front matter
/// should surface, not silently sync without metadata.
pub fn parse(markdown: &str) -> Result<(Mapping, &str), AppError> {
    let Some(rest) = markdown.strip_prefix("---\n").or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return Ok((Mapping::new(), markdown));
    };

    // The closing fence is a line holding exactly `---`; it may be the
    // very first line, in which case the front matter is empty.
    let mut offset = 0;
    let mut fence = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            fence = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_len, body_start)) = fence else {
        // An opening fence without a closing one is body text.
        return Ok((Mapping::new(), markdown));
    };
    let body = &rest[body_start..];

    let mapping: Mapping = if rest[..yaml_len].trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(&rest[..yaml_len]).map_err(|e| AppError::FrontMatter {
            path: String::new(),
            message: e.to_string(),
        })?
    };

    Ok((mapping, body))
}

/// Reads a string-valued key from a front-matter mapping.
pub fn string_field(front: &Mapping, key: &str) -> String {
    match front.get(&Yaml::String(key.to_string())) {
        Some(Yaml::String(s)) => s.clone(),
        Some(Yaml::Number(n)) => n.to_string(),
        Some(Yaml::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads a list-of-strings key; a scalar becomes a single-element list.
pub fn string_list(front: &Mapping, key: &str) -> Vec<String> {
    match front.get(&Yaml::String(key.to_string())) {
        Some(Yaml::Sequence(items)) => items
            .iter()
            .filter_map(|item| match item {
                Yaml::String(s) => Some(s.clone()),
                Yaml::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Yaml::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// The remembered remote page id for a target, if this note was pushed
/// to it before.
pub fn stored_page_id(front: &Mapping, ab_name: &str) -> Option<PageId> {
    let raw = string_field(front, &notion_id_key(ab_name));
    if raw.is_empty() {
        return None;
    }
    match PageId::parse(&raw) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Ignoring malformed stored page id '{}': {}", raw, e);
            None
        }
    }
}

/// Converts a YAML front-matter value into JSON for the property builder.
pub fn yaml_to_json(value: &Yaml) -> serde_json::Value {
    match value {
        Yaml::Null => serde_json::Value::Null,
        Yaml::Bool(b) => serde_json::Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else {
                n.as_f64().map(serde_json::Value::from).unwrap_or(serde_json::Value::Null)
            }
        }
        Yaml::String(s) => serde_json::Value::String(s.clone()),
        Yaml::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(yaml_to_json).collect())
        }
        Yaml::Mapping(map) => serde_json::Value::Object(
            map.iter()
                .filter_map(|(k, v)| {
                    k.as_str().map(|key| (key.to_string(), yaml_to_json(v)))
                })
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Collects the custom-property values a target wants from front matter.
///
/// Non-title properties contribute only when the note defines them. The
/// title-typed property always gets a value: the front-matter entry when
/// present, otherwise the file stem.
pub fn custom_values(
    front: &Mapping,
    target: &DatabaseTarget,
    file_stem: &str,
) -> serde_json::Map<String, serde_json::Value> {
    let mut values = serde_json::Map::new();

    for property in &target.custom_properties {
        if property.kind == CustomPropertyKind::Title {
            continue;
        }
        if let Some(value) = front.get(&Yaml::String(property.name.clone())) {
            values.insert(property.name.clone(), yaml_to_json(value));
        }
    }

    if let Some(title) = target.title_property() {
        let value = front
            .get(&Yaml::String(title.name.clone()))
            .map(yaml_to_json)
            .unwrap_or_else(|| serde_json::Value::String(file_stem.to_string()));
        values.insert(title.name.clone(), value);
    }

    values
}

/// Writes the new page id and link back into a note's front matter,
/// replacing any previously stored values under the same keys.
///
/// The rewrite is atomic with respect to the rest of the file: the new
/// content lands in a sibling temp file first and is renamed over the
/// original.
pub fn update_sync_info(
    path: &Path,
    ab_name: &str,
    page_id: &PageId,
    link: Option<&str>,
) -> Result<(), AppError> {
    let original = std::fs::read_to_string(path)?;
    let (mut front, body) = parse(&original).map_err(|e| annotate(e, path))?;

    let id_key = Yaml::String(notion_id_key(ab_name));
    let l_key = Yaml::String(link_key(ab_name));
    front.remove(&id_key);
    front.remove(&l_key);
    front.insert(id_key, Yaml::String(page_id.as_str().to_string()));
    if let Some(url) = link {
        front.insert(l_key, Yaml::String(url.to_string()));
    }

    let yaml = serde_yaml::to_string(&front).map_err(|e| AppError::FrontMatter {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let updated = format!("---\n{}---\n{}", yaml, body);

    let temp_path = path.with_extension("md.vault2notion.tmp");
    std::fs::write(&temp_path, &updated)?;
    std::fs::rename(&temp_path, path)?;

    log::debug!(
        "Stored page id {} under '{}' in {}",
        page_id.as_str(),
        notion_id_key(ab_name),
        path.display()
    );
    Ok(())
}

fn annotate(error: AppError, path: &Path) -> AppError {
    match error {
        AppError::FrontMatter { message, .. } => AppError::FrontMatter {
            path: path.display().to_string(),
            message,
        },
        other => other,
    }
}
