// src/model/block.rs
//! Content blocks bound for the page-creation endpoint.
//!
//! The pipeline only ever inspects two block shapes: paragraphs, whose
//! rich-text array may exceed the per-block span limit, and code blocks,
//! whose spans may carry annotations the creation endpoint rejects.
//! Everything else the markdown converter produces travels through as
//! opaque JSON, untouched.

use crate::types::RichTextItem;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Text content of a paragraph block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlockContent {
    pub rich_text: Vec<RichTextItem>,
}

/// Content of a code block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeContent {
    pub rich_text: Vec<RichTextItem>,
    pub language: String,
}

/// One block in a note's body.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(TextBlockContent),
    Code(CodeContent),
    /// Any block kind the pipeline does not inspect, carried verbatim.
    Other(Value),
}

impl Block {
    /// Convenience constructor for a paragraph block.
    pub fn paragraph(rich_text: Vec<RichTextItem>) -> Self {
        Self::Paragraph(TextBlockContent { rich_text })
    }

    /// Convenience constructor for a code block.
    pub fn code(rich_text: Vec<RichTextItem>, language: impl Into<String>) -> Self {
        Self::Code(CodeContent {
            rich_text,
            language: language.into(),
        })
    }

    /// The block's wire-level type tag, for logging.
    pub fn kind(&self) -> &str {
        match self {
            Self::Paragraph(_) => "paragraph",
            Self::Code(_) => "code",
            Self::Other(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

// The wire shape is {"object":"block","type":"paragraph","paragraph":{...}}.
// Opaque blocks are assumed to already be in wire shape.
impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Paragraph(content) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("object", "block")?;
                map.serialize_entry("type", "paragraph")?;
                map.serialize_entry(
                    "paragraph",
                    &serde_json::json!({ "rich_text": content.rich_text }),
                )?;
                map.end()
            }
            Self::Code(content) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("object", "block")?;
                map.serialize_entry("type", "code")?;
                map.serialize_entry(
                    "code",
                    &serde_json::json!({
                        "rich_text": content.rich_text,
                        "language": content.language,
                    }),
                )?;
                map.end()
            }
            Self::Other(value) => value.serialize(serializer),
        }
    }
}
