// src/sync.rs
//! Per-file sync — extraction, upload, and write-back for one note.
//!
//! [`NoteSyncer`] is the seam between the batch driver and everything a
//! single file's push involves. The production implementation,
//! [`VaultSyncer`], reads the note, extracts format-specific fields from
//! its front matter, runs the upsert orchestrator, and on success writes
//! the new remote identifier and link back into the note.

use crate::api::{NotionBackend, PageResponse};
use crate::body::{GeneralFields, NextFields};
use crate::config::{DatabaseTarget, SyncSettings, TargetFormat};
use crate::convert::MarkdownConverter;
use crate::error::AppError;
use crate::frontmatter;
use crate::upload::{shareable_link, SyncRequest, Uploader};
use serde_yaml::Mapping;
use std::path::Path;

/// Outcome of one file's attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The file had no document text; not an error.
    Skipped,
    /// The attempt ran; the response carries success or rejection.
    Completed(PageResponse),
}

/// The ability to sync one vault file to a target.
#[async_trait::async_trait]
pub trait NoteSyncer: Send + Sync {
    async fn sync_file(&self, file: &Path) -> Result<FileOutcome, AppError>;
}

/// Production syncer backed by the real front-matter layer and a
/// [`NotionBackend`].
pub struct VaultSyncer<'a> {
    backend: &'a dyn NotionBackend,
    converter: &'a dyn MarkdownConverter,
    target: &'a DatabaseTarget,
    settings: &'a SyncSettings,
    /// Whether to copy the new page link to the clipboard after success.
    pub copy_link: bool,
}

impl<'a> VaultSyncer<'a> {
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
            copy_link: false,
        }
    }

    /// Builds the format-specific sync request from parsed front matter.
    fn build_request(&self, front: &Mapping, body: &str, file_stem: &str) -> SyncRequest {
        let cover = frontmatter::string_field(front, "coverurl");

        match self.target.format {
            TargetFormat::General => SyncRequest::General {
                body: body.to_string(),
                fields: GeneralFields {
                    title: file_stem.to_string(),
                    tags: frontmatter::string_list(front, "tags"),
                },
                cover,
            },
            TargetFormat::Next => SyncRequest::Next {
                body: body.to_string(),
                fields: NextFields {
                    title: file_stem.to_string(),
                    emoji: frontmatter::string_field(front, "titleicon"),
                    tags: frontmatter::string_list(front, "tags"),
                    page_type: frontmatter::string_field(front, "type"),
                    slug: frontmatter::string_field(front, "slug"),
                    status: {
                        let stats = frontmatter::string_field(front, "stats");
                        if stats.is_empty() {
                            frontmatter::string_field(front, "status")
                        } else {
                            stats
                        }
                    },
                    category: frontmatter::string_field(front, "category"),
                    summary: frontmatter::string_field(front, "summary"),
                    password: frontmatter::string_field(front, "password"),
                    favicon: frontmatter::string_field(front, "icon"),
                    datetime: frontmatter::string_field(front, "date"),
                },
                cover,
            },
            TargetFormat::Custom => SyncRequest::Custom {
                body: body.to_string(),
                values: frontmatter::custom_values(front, self.target, file_stem),
                cover,
            },
        }
    }

    /// After a successful push: store the identifier and link in front
    /// matter, and optionally copy the link. Write-back failures raise;
    /// clipboard failures are best-effort and only logged, since the
    /// sync itself already completed.
    fn record_success(&self, file: &Path, response: &PageResponse) -> Result<(), AppError> {
        let Some(page_id) = response.page_id() else {
            log::warn!(
                "Creation response for {} carried no page id; front matter left untouched",
                file.display()
            );
            return Ok(());
        };

        let link = response
            .page_url()
            .map(|url| shareable_link(url, &self.settings.notion_user));
        let stored_link = if self.settings.store_link {
            link.as_deref()
        } else {
            None
        };

        frontmatter::update_sync_info(file, &self.target.ab_name, &page_id, stored_link)?;

        if self.copy_link {
            if let Some(url) = &link {
                if let Err(e) = crate::output::clipboard::copy_to_clipboard(url) {
                    log::warn!("Could not copy page link to clipboard: {}", e);
                }
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl NoteSyncer for VaultSyncer<'_> {
    async fn sync_file(&self, file: &Path) -> Result<FileOutcome, AppError> {
        let markdown = std::fs::read_to_string(file)?;
        let (front, body) = frontmatter::parse(&markdown).map_err(|e| match e {
            AppError::FrontMatter { message, .. } => AppError::FrontMatter {
                path: file.display().to_string(),
                message,
            },
            other => other,
        })?;

        if body.trim().is_empty() {
            log::warn!("Skipping {}: no document text", file.display());
            return Ok(FileOutcome::Skipped);
        }

        let file_stem = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let request = self.build_request(&front, body, &file_stem);
        let existing = frontmatter::stored_page_id(&front, &self.target.ab_name);

        log::info!(
            "Syncing {} to '{}' ({})",
            file.display(),
            self.target.full_name,
            if existing.is_some() { "update" } else { "create" },
        );

        let uploader = Uploader::new(self.backend, self.converter, self.target, self.settings);
        let response = uploader.sync(&request, existing.as_ref()).await?;

        if response.is_success() {
            self.record_success(file, &response)?;
        }

        Ok(FileOutcome::Completed(response))
    }
}
