// src/api/mod.rs
//! Notion API interaction — the ability to create, append to, and delete
//! pages in a workspace.
//!
//! Business logic depends on the [`NotionBackend`] trait, never on HTTP
//! details; the orchestrator and batch driver are tested against a
//! scripted fake.

pub mod client;

use crate::body::PageBody;
use crate::error::{AppError, NotionErrorCode};
use crate::model::Block;
use crate::types::{DatabaseId, PageId};
use serde_json::Value;

pub use client::NotionHttpClient;

/// Uniform result envelope for one remote call.
///
/// Non-200 responses are NOT errors: they carry the remote's verbatim
/// JSON body back to the caller, which decides whether to count a
/// failure, log, or abort. Only transport-level failures raise.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub status: u16,
    pub data: Value,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The created page's identifier, present on successful creation.
    pub fn page_id(&self) -> Option<PageId> {
        self.data
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| PageId::parse(id).ok())
    }

    /// The created page's shareable URL, present on successful creation.
    pub fn page_url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }

    /// The typed error code of a rejection body, if one is present.
    pub fn error_code(&self) -> Option<NotionErrorCode> {
        self.data
            .get("code")
            .and_then(Value::as_str)
            .map(NotionErrorCode::from_api_response)
    }

    /// The remote's human-readable rejection message, if present.
    pub fn error_message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// The ability to mutate a Notion workspace.
///
/// This is the fundamental algebra for the upload pipeline: create a
/// page with its first block chunk, append further chunks, delete a
/// superseded page, and read a database's own cover for the update path.
#[async_trait::async_trait]
pub trait NotionBackend: Send + Sync {
    async fn create_page(&self, body: &PageBody) -> Result<PageResponse, AppError>;
    async fn append_children(
        &self,
        page: &PageId,
        children: &[Block],
    ) -> Result<PageResponse, AppError>;
    async fn delete_page(&self, page: &PageId) -> Result<PageResponse, AppError>;
    async fn retrieve_database(&self, database: &DatabaseId) -> Result<PageResponse, AppError>;

    /// The external cover URL a database carries, if any.
    async fn database_cover(&self, database: &DatabaseId) -> Result<Option<String>, AppError> {
        let response = self.retrieve_database(database).await?;
        Ok(response
            .data
            .pointer("/cover/external/url")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_response_extracts_id_and_url() {
        let response = PageResponse {
            status: 200,
            data: json!({
                "id": "1429989f-e8ac-4eff-bc8f-57f56486db54",
                "url": "https://www.notion.so/My-Note-1429989fe8ac4effbc8f57f56486db54"
            }),
        };
        assert!(response.is_success());
        assert_eq!(
            response.page_id().unwrap().as_str(),
            "1429989fe8ac4effbc8f57f56486db54"
        );
        assert!(response.page_url().unwrap().starts_with("https://"));
    }

    #[test]
    fn rejection_body_surfaces_typed_code_and_message() {
        let response = PageResponse {
            status: 400,
            data: json!({
                "object": "error",
                "status": 400,
                "code": "validation_error",
                "message": "body failed validation"
            }),
        };
        assert!(!response.is_success());
        assert_eq!(
            response.error_code().unwrap(),
            NotionErrorCode::ValidationFailed
        );
        assert_eq!(response.error_message().unwrap(), "body failed validation");
    }
}
