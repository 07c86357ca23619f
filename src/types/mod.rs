// src/types/mod.rs
//! Domain types — the strongly-typed vocabulary the rest of the crate
//! speaks in. Raw strings stop at this boundary.

mod api_key;
mod ids;
mod rich_text;

pub use api_key::ApiKey;
pub use ids::{DatabaseId, PageId};
pub use rich_text::{Annotations, RichTextItem, SpanType, TextContent, TextLink};

use thiserror::Error;

/// Validation failures for domain type construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid API key: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Invalid Notion ID: {reason}")]
    InvalidId { reason: String },
}
