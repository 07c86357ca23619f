// src/upload.rs
//! Upsert orchestration — one upload attempt from markdown to remote page.
//!
//! The attempt walks a fixed sequence: delete the superseded page when
//! updating, build the format-specific body, apply the resolved cover,
//! create the page with the first block chunk, then append any extra
//! chunks. No retries happen inside an attempt.
//!
//! Overall success is reported from the page-creation response alone.
//! Append calls that fail afterwards are each attempted and logged but
//! do not flip the attempt's outcome; this mirrors the behavior the
//! remembered-identifier workflow has always had and callers are written
//! against it.

use crate::api::{NotionBackend, PageResponse};
use crate::body::{
    build_custom_body, build_general_body, build_next_body, GeneralFields, NextFields, PageBody,
};
use crate::config::{DatabaseTarget, SyncSettings, TargetFormat};
use crate::convert::{ConvertOptions, MarkdownConverter};
use crate::error::AppError;
use crate::prepare::{prepare_blocks, PreparedBlocks};
use crate::types::{DatabaseId, PageId};
use serde_json::{Map, Value};

/// One upload attempt's inputs, discriminated by format variant.
///
/// Constructed per attempt and discarded once the attempt resolves.
#[derive(Debug, Clone)]
pub enum SyncRequest {
    General {
        /// Note body with front matter already removed.
        body: String,
        fields: GeneralFields,
        cover: String,
    },
    Next {
        body: String,
        fields: NextFields,
        cover: String,
    },
    Custom {
        body: String,
        /// Front-matter values keyed by property display name.
        values: Map<String, Value>,
        cover: String,
    },
}

impl SyncRequest {
    fn body(&self) -> &str {
        match self {
            Self::General { body, .. } | Self::Next { body, .. } | Self::Custom { body, .. } => {
                body
            }
        }
    }

    fn cover(&self) -> &str {
        match self {
            Self::General { cover, .. } | Self::Next { cover, .. } | Self::Custom { cover, .. } => {
                cover
            }
        }
    }

    /// The format this request was built for, for mismatch checks.
    pub fn format(&self) -> TargetFormat {
        match self {
            Self::General { .. } => TargetFormat::General,
            Self::Next { .. } => TargetFormat::Next,
            Self::Custom { .. } => TargetFormat::Custom,
        }
    }
}

/// Drives one upload attempt against a single target.
pub struct Uploader<'a> {
    backend: &'a dyn NotionBackend,
    converter: &'a dyn MarkdownConverter,
    target: &'a DatabaseTarget,
    settings: &'a SyncSettings,
}

impl<'a> Uploader<'a> {
    pub fn new(
        backend: &'a dyn NotionBackend,
        converter: &'a dyn MarkdownConverter,
        target: &'a DatabaseTarget,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            backend,
            converter,
            target,
            settings,
        }
    }

    /// Runs the full upsert sequence for one note.
    ///
    /// `existing` is the remembered remote identifier from the note's
    /// front matter; when present the old page is deleted first and the
    /// push behaves as an update.
    pub async fn sync(
        &self,
        request: &SyncRequest,
        existing: Option<&PageId>,
    ) -> Result<PageResponse, AppError> {
        let database_id = self.database_id()?;

        let options = ConvertOptions {
            strict_image_urls: matches!(request, SyncRequest::Custom { .. }),
            truncate: false,
        };
        let blocks = self.converter.convert(request.body(), &options)?;
        let prepared = prepare_blocks(blocks);

        log::debug!(
            "Prepared {} block(s) for '{}': first chunk {}, {} extra chunk(s), existing id {:?}",
            prepared.total_blocks(),
            self.target.full_name,
            prepared.first_chunk.len(),
            prepared.extra_chunks.len(),
            existing.map(PageId::as_str),
        );

        let cover = self.resolve_cover(request.cover(), existing, &database_id).await?;

        if let Some(page_id) = existing {
            log::info!("Deleting superseded Notion page {}", page_id.as_str());
            let deleted = self.backend.delete_page(page_id).await?;
            if !deleted.is_success() {
                // An update must not fall through to creating a duplicate
                // beside a page it failed to remove.
                self.log_rejection("delete", &deleted);
                return Ok(deleted);
            }
        }

        let PreparedBlocks {
            first_chunk,
            extra_chunks,
        } = prepared;

        let mut body = match request {
            SyncRequest::General { fields, .. } => {
                build_general_body(self.target, database_id, fields, first_chunk)
            }
            SyncRequest::Next { fields, .. } => build_next_body(database_id, fields, first_chunk),
            SyncRequest::Custom { values, .. } => {
                build_custom_body(self.target, database_id, values, first_chunk)
            }
        };
        body.apply_cover(cover.as_deref(), &self.settings.banner_url);

        self.submit(body, extra_chunks).await
    }

    fn database_id(&self) -> Result<DatabaseId, AppError> {
        DatabaseId::parse(&self.target.database_id).map_err(|e| {
            AppError::MissingConfiguration(format!(
                "target '{}' has an invalid database id: {}",
                self.target.ab_name, e
            ))
        })
    }

    /// Cover resolution: explicit cover wins; on the update path an
    /// unset cover falls back to the remote database's own cover. The
    /// process-wide default banner is applied later by
    /// [`PageBody::apply_cover`].
    async fn resolve_cover(
        &self,
        explicit: &str,
        existing: Option<&PageId>,
        database_id: &DatabaseId,
    ) -> Result<Option<String>, AppError> {
        if !explicit.is_empty() {
            return Ok(Some(explicit.to_string()));
        }
        if existing.is_none() {
            return Ok(None);
        }

        let database_cover = self.backend.database_cover(database_id).await?;
        if let Some(url) = &database_cover {
            log::debug!("Reusing database cover for update: {}", url);
        }
        Ok(database_cover)
    }

    /// Creates the page, then appends any extra chunks sequentially.
    ///
    /// A rejected append is logged and the remaining chunks are still
    /// attempted; only transport failures abort.
    async fn submit(
        &self,
        body: PageBody,
        extra_chunks: Vec<Vec<crate::model::Block>>,
    ) -> Result<PageResponse, AppError> {
        let response = self.backend.create_page(&body).await?;

        if !response.is_success() {
            self.log_rejection("create", &response);
            return Ok(response);
        }

        if let Some(page_id) = response.page_id() {
            let chunk_count = extra_chunks.len();
            for (index, chunk) in extra_chunks.into_iter().enumerate() {
                let appended = self.backend.append_children(&page_id, &chunk).await?;
                if appended.is_success() {
                    log::info!(
                        "Appended chunk {}/{} ({} blocks) to page {}",
                        index + 1,
                        chunk_count,
                        chunk.len(),
                        page_id.as_str()
                    );
                } else {
                    self.log_rejection("append", &appended);
                }
            }
        }

        Ok(response)
    }

    fn log_rejection(&self, operation: &str, response: &PageResponse) {
        let code = response.error_code();
        let retryable = code.as_ref().is_some_and(|c| c.is_retryable());
        log::error!(
            "Notion rejected {} for '{}': status {}, code {}, message {:?}{}",
            operation,
            self.target.full_name,
            response.status,
            code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()),
            response.error_message().unwrap_or("<none>"),
            if retryable { " (transient, may clear on a later run)" } else { "" },
        );
    }
}

/// Rewrites a page URL to the workspace's public domain when the user
/// has one configured.
pub fn shareable_link(url: &str, notion_user: &str) -> String {
    if notion_user.is_empty() {
        url.to_string()
    } else {
        url.replace("www.notion.so", &format!("{}.notion.site", notion_user))
    }
}
