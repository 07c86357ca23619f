// src/types/rich_text.rs
//! Rich text spans as the page-creation endpoint accepts them.
//!
//! This is the *outbound* shape: only `text` spans, with optional
//! styling annotations. The upload pipeline never needs mentions or
//! equations, so they are not modelled.

use serde::{Deserialize, Serialize};

/// Text content of a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub link: Option<TextLink>,
}

/// Link target on a text span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLink {
    pub url: String,
}

/// Styling annotations on a span.
///
/// The page-creation endpoint rejects these on code-block spans, which
/// is why the block preparer strips them there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

/// One rich-text span in a block's text array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextItem {
    #[serde(rename = "type")]
    pub span_type: SpanType,
    pub text: TextContent,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub annotations: Option<Annotations>,
}

/// Span discriminator — outbound spans are always `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanType {
    Text,
}

impl RichTextItem {
    /// Create a plain text span — the most common case in builders and
    /// tests. Instead of spelling out every field:
    /// ```ignore
    /// RichTextItem::plain("hello")
    /// ```
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            span_type: SpanType::Text,
            text: TextContent {
                content: content.into(),
                link: None,
            },
            annotations: None,
        }
    }

    /// Create a span carrying styling annotations.
    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            annotations: Some(annotations),
            ..Self::plain(content)
        }
    }
}
