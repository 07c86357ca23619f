// src/config.rs
//! Sync configuration — global settings plus the named database targets
//! a note can be pushed to.
//!
//! A target identifies one remote database: which format variant its
//! properties follow, the credential and database id, and (for the
//! `custom` variant) an ordered list of property definitions. Targets
//! live in a JSON file loaded at startup.

use crate::error::AppError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which property schema a target's database follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    /// Title plus optional tags.
    General,
    /// The fixed NotionNext blog schema.
    Next,
    /// User-defined ordered property list.
    Custom,
}

/// Remote property type tags for custom targets.
///
/// Matches the Notion property type vocabulary; anything the builder
/// does not recognize deserializes to `Unsupported` and is omitted from
/// page bodies rather than rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomPropertyKind {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Relation,
    #[serde(other)]
    Unsupported,
}

/// One property definition of a custom-format target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProperty {
    /// Display name, matched against front-matter keys.
    pub name: String,
    /// Remote property type tag.
    pub kind: CustomPropertyKind,
    /// Ordinal position; 0 is reserved for the title-equivalent property.
    pub position: usize,
}

/// One configured remote database a note can be pushed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTarget {
    pub format: TargetFormat,
    /// Human-readable name shown in logs and summaries.
    pub full_name: String,
    /// Abbreviation namespacing the per-target front-matter keys.
    pub ab_name: String,
    /// Integration token. May be empty in a half-configured target;
    /// the batch driver short-circuits on it before any network call.
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub database_id: String,
    /// Whether general-format bodies carry a multi-select tags property.
    #[serde(default)]
    pub enable_tags: bool,
    /// Whether the title property uses a custom name instead of "title".
    #[serde(default)]
    pub custom_title: bool,
    #[serde(default)]
    pub custom_title_name: String,
    #[serde(default)]
    pub custom_properties: Vec<CustomProperty>,
}

impl DatabaseTarget {
    /// The property name that carries the page title for general bodies.
    pub fn title_property_name(&self) -> &str {
        if self.custom_title && !self.custom_title_name.is_empty() {
            &self.custom_title_name
        } else {
            "title"
        }
    }

    /// The title-typed definition of a custom target, if one exists.
    pub fn title_property(&self) -> Option<&CustomProperty> {
        self.custom_properties
            .iter()
            .find(|p| p.kind == CustomPropertyKind::Title)
    }

    /// Whether the target is configured enough to reach the network.
    pub fn is_configured(&self) -> bool {
        !self.api_token.is_empty() && !self.database_id.is_empty()
    }

    /// Checks the custom-property invariants: at most one title-typed
    /// definition, unique contiguous positions starting at 0, and the
    /// title-typed definition (when present) at position 0.
    pub fn validate(&self) -> Result<(), AppError> {
        let titles = self
            .custom_properties
            .iter()
            .filter(|p| p.kind == CustomPropertyKind::Title)
            .count();
        if titles > 1 {
            return Err(AppError::MissingConfiguration(format!(
                "target '{}' declares {} title properties; at most one is allowed",
                self.ab_name, titles
            )));
        }

        let mut positions: Vec<usize> =
            self.custom_properties.iter().map(|p| p.position).collect();
        positions.sort_unstable();
        if positions.iter().enumerate().any(|(i, &p)| i != p) {
            return Err(AppError::MissingConfiguration(format!(
                "target '{}' has non-contiguous property positions {:?}",
                self.ab_name, positions
            )));
        }

        if let Some(title) = self.title_property() {
            if title.position != 0 {
                return Err(AppError::MissingConfiguration(format!(
                    "target '{}' places its title property at position {}; position 0 is reserved for it",
                    self.ab_name, title.position
                )));
            }
        }

        Ok(())
    }
}

/// Removes the definition at `position` and returns a recompacted list.
///
/// Pure by design: the contiguous-ordinal invariant is restored by
/// [`recompact`] on the returned list rather than by in-place index
/// surgery, so it can be checked in isolation.
pub fn remove_property(properties: &[CustomProperty], position: usize) -> Vec<CustomProperty> {
    let remaining: Vec<CustomProperty> = properties
        .iter()
        .filter(|p| p.position != position)
        .cloned()
        .collect();
    recompact(remaining)
}

/// Renumbers positions to a contiguous 0..n range, preserving order.
pub fn recompact(mut properties: Vec<CustomProperty>) -> Vec<CustomProperty> {
    properties.sort_by_key(|p| p.position);
    for (index, property) in properties.iter_mut().enumerate() {
        property.position = index;
    }
    properties
}

/// Global, target-independent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SyncSettings {
    /// Default cover image applied when neither the note nor the remote
    /// database supplies one. Empty means no default.
    #[serde(default)]
    pub banner_url: String,
    /// Workspace subdomain; when set, stored links use
    /// `<user>.notion.site` instead of `www.notion.so`.
    #[serde(default)]
    pub notion_user: String,
    /// Whether to write the shareable link into front matter alongside
    /// the page id.
    #[serde(default = "default_true")]
    pub store_link: bool,
}

fn default_true() -> bool {
    true
}

/// The full configuration file: settings plus named targets, in the
/// order the user declared them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub settings: SyncSettings,
    #[serde(default)]
    pub targets: IndexMap<String, DatabaseTarget>,
}

impl SyncConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: SyncConfig =
            serde_json::from_str(&raw).map_err(|e| AppError::ConfigFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        for target in config.targets.values() {
            target.validate()?;
        }

        log::info!(
            "Loaded {} target(s) from {}",
            config.targets.len(),
            path.display()
        );
        Ok(config)
    }

    /// Looks up a target by its abbreviation.
    pub fn target(&self, ab_name: &str) -> Result<&DatabaseTarget, AppError> {
        self.targets
            .values()
            .find(|t| t.ab_name == ab_name)
            .ok_or_else(|| {
                AppError::MissingConfiguration(format!(
                    "no target with abbreviation '{}' (known: {})",
                    ab_name,
                    self.targets
                        .values()
                        .map(|t| t.ab_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property(name: &str, kind: CustomPropertyKind, position: usize) -> CustomProperty {
        CustomProperty {
            name: name.to_string(),
            kind,
            position,
        }
    }

    fn custom_target(properties: Vec<CustomProperty>) -> DatabaseTarget {
        DatabaseTarget {
            format: TargetFormat::Custom,
            full_name: "Writing".to_string(),
            ab_name: "wr".to_string(),
            api_token: "secret_abcdefghijklmnop".to_string(),
            database_id: "d".repeat(32),
            enable_tags: false,
            custom_title: false,
            custom_title_name: String::new(),
            custom_properties: properties,
        }
    }

    #[test]
    fn recompact_renumbers_to_contiguous_range() {
        let compacted = recompact(vec![
            property("Status", CustomPropertyKind::Select, 4),
            property("Name", CustomPropertyKind::Title, 0),
            property("Tags", CustomPropertyKind::MultiSelect, 2),
        ]);
        assert_eq!(
            compacted.iter().map(|p| p.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        // Relative order by original position is preserved.
        assert_eq!(compacted[0].name, "Name");
        assert_eq!(compacted[1].name, "Tags");
        assert_eq!(compacted[2].name, "Status");
    }

    #[test]
    fn remove_property_recompacts_the_survivors() {
        let properties = vec![
            property("Name", CustomPropertyKind::Title, 0),
            property("Status", CustomPropertyKind::Select, 1),
            property("Due", CustomPropertyKind::Date, 2),
        ];
        let remaining = remove_property(&properties, 1);
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[1].name, "Due");
        assert_eq!(remaining[1].position, 1);
    }

    #[test]
    fn two_title_properties_fail_validation() {
        let target = custom_target(vec![
            property("Name", CustomPropertyKind::Title, 0),
            property("AlsoName", CustomPropertyKind::Title, 1),
        ]);
        assert!(target.validate().is_err());
    }

    #[test]
    fn title_away_from_position_zero_fails_validation() {
        let target = custom_target(vec![
            property("Status", CustomPropertyKind::Select, 0),
            property("Name", CustomPropertyKind::Title, 1),
        ]);
        assert!(target.validate().is_err());
    }

    #[test]
    fn gapped_positions_fail_validation() {
        let target = custom_target(vec![
            property("Name", CustomPropertyKind::Title, 0),
            property("Status", CustomPropertyKind::Select, 3),
        ]);
        assert!(target.validate().is_err());
    }

    #[test]
    fn unknown_property_kind_deserializes_as_unsupported() {
        let parsed: CustomProperty = serde_json::from_str(
            r#"{ "name": "Rating", "kind": "starfield", "position": 1 }"#,
        )
        .unwrap();
        assert_eq!(parsed.kind, CustomPropertyKind::Unsupported);
    }

    #[test]
    fn title_property_name_honours_the_custom_toggle() {
        let mut target = custom_target(Vec::new());
        assert_eq!(target.title_property_name(), "title");
        target.custom_title = true;
        target.custom_title_name = "Name".to_string();
        assert_eq!(target.title_property_name(), "Name");
    }
}
