// src/api/client.rs
//! Pure HTTP client wrapper for the Notion API.
//!
//! A thin wrapper around reqwest that handles authentication headers and
//! the four wire operations the pipeline needs. Response bodies come
//! back as loose JSON inside a [`PageResponse`] envelope; interpretation
//! belongs to the caller.

use super::{NotionBackend, PageResponse};
use crate::body::PageBody;
use crate::constants::{API_BASE_URL, NOTION_VERSION};
use crate::error::AppError;
use crate::model::Block;
use crate::types::{ApiKey, DatabaseId, PageId};
use reqwest::{header, Client, Response};
use serde_json::Value;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self { client })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Converts an HTTP response into the uniform envelope, parsing the
    /// body as JSON when possible and preserving it verbatim otherwise.
    async fn into_envelope(response: Response, context: &str) -> Result<PageResponse, AppError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::transport(context, &e))?;

        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::json!({ "message": text }))
        };

        Ok(PageResponse { status, data })
    }
}

#[async_trait::async_trait]
impl NotionBackend for NotionHttpClient {
    async fn create_page(&self, body: &PageBody) -> Result<PageResponse, AppError> {
        let url = format!("{}/pages", API_BASE_URL);
        log::debug!("POST {}", url);

        let context = "Creating Notion page";
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::transport(context, &e))?;
        Self::into_envelope(response, context).await
    }

    async fn append_children(
        &self,
        page: &PageId,
        children: &[Block],
    ) -> Result<PageResponse, AppError> {
        let url = format!("{}/blocks/{}/children", API_BASE_URL, page.as_str());
        log::debug!("PATCH {} ({} blocks)", url, children.len());

        let context = format!("Appending blocks to page {}", page.as_str());
        let response = self
            .client
            .patch(url)
            .json(&serde_json::json!({ "children": children }))
            .send()
            .await
            .map_err(|e| AppError::transport(context.clone(), &e))?;
        Self::into_envelope(response, &context).await
    }

    async fn delete_page(&self, page: &PageId) -> Result<PageResponse, AppError> {
        let url = format!("{}/blocks/{}", API_BASE_URL, page.as_str());
        log::debug!("DELETE {}", url);

        let context = format!("Deleting Notion page {}", page.as_str());
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| AppError::transport(context.clone(), &e))?;
        Self::into_envelope(response, &context).await
    }

    async fn retrieve_database(&self, database: &DatabaseId) -> Result<PageResponse, AppError> {
        let url = format!("{}/databases/{}", API_BASE_URL, database.as_str());
        log::debug!("GET {}", url);

        let context = format!("Fetching database {}", database.as_str());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::transport(context.clone(), &e))?;
        Self::into_envelope(response, &context).await
    }
}
