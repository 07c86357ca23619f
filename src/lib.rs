// src/lib.rs
//! vault2notion library — pushes markdown notes from a local vault into
//! Notion databases.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `ValidationError`, `NotionErrorCode`
//! - **Configuration** — `SyncConfig`, `DatabaseTarget`, `CustomProperty`
//! - **Domain types** — `ApiKey`, `PageId`, `DatabaseId`, rich text
//! - **Upload pipeline** — `prepare_blocks`, page body builders,
//!   `Uploader`, `SyncRequest`
//! - **Batch driver** — `run_batch`, `BatchResult`
//! - **API client** — `NotionBackend`, `NotionHttpClient`, `PageResponse`

mod api;
mod batch;
mod body;
mod config;
mod constants;
mod convert;
mod error;
mod frontmatter;
mod model;
mod output;
mod prepare;
mod sync;
mod types;
mod upload;
mod vault;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    recompact, remove_property, CustomProperty, CustomPropertyKind, DatabaseTarget, SyncConfig,
    SyncSettings, TargetFormat,
};

// --- Domain Types ---
pub use crate::types::{Annotations, ApiKey, DatabaseId, PageId, RichTextItem, TextContent};

// --- Domain Model ---
pub use crate::model::{Block, CodeContent, TextBlockContent};

// --- Conversion Seam ---
pub use crate::convert::{BasicConverter, ConvertOptions, MarkdownConverter};

// --- Upload Pipeline ---
pub use crate::body::{
    build_custom_body, build_general_body, build_next_body, custom_property_value, ExternalCover,
    GeneralFields, NextFields, PageBody,
};
pub use crate::prepare::{
    chunk_blocks, prepare_blocks, split_oversized_paragraphs, strip_code_annotations,
    PreparedBlocks,
};
pub use crate::upload::{shareable_link, SyncRequest, Uploader};

// --- Per-file Sync ---
pub use crate::frontmatter::{
    custom_values, link_key, notion_id_key, stored_page_id, update_sync_info,
};
pub use crate::sync::{FileOutcome, NoteSyncer, VaultSyncer};

// --- Batch Driver ---
pub use crate::batch::{format_summary, run_batch, BatchResult, FileError};

// --- Vault Files ---
pub use crate::vault::{collect_markdown_files, filter_unsynced};

// --- API Client ---
pub use crate::api::{NotionBackend, NotionHttpClient, PageResponse};

// --- Constants ---
pub use crate::constants::{BATCH_REQUEST_DELAY_MS, BLOCKS_PER_REQUEST, RICH_TEXT_SPANS_PER_BLOCK};
