// tests/upload_pipeline.rs
//! End-to-end tests for the upload orchestration against a scripted
//! backend fake: call ordering on the update path, cover resolution,
//! chunked appends, and the create-response-driven outcome.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Map, Value};

use vault2notion::{
    AppError, BasicConverter, Block, CustomProperty, CustomPropertyKind, DatabaseId,
    DatabaseTarget, GeneralFields, NotionBackend, PageBody, PageId, PageResponse, SyncRequest,
    SyncSettings, TargetFormat, Uploader,
};

const CREATED_PAGE_ID: &str = "1429989fe8ac4effbc8f57f56486db54";
const EXISTING_PAGE_ID: &str = "aaaa989fe8ac4effbc8f57f56486db54";
const DATABASE_ID: &str = "bbbb989fe8ac4effbc8f57f56486db54";

/// Records every backend call in order and replays scripted responses.
struct FakeBackend {
    calls: Mutex<Vec<String>>,
    create_response: PageResponse,
    delete_response: PageResponse,
    append_responses: Mutex<VecDeque<PageResponse>>,
    database_body: Value,
    created_body: Mutex<Option<PageBody>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            create_response: PageResponse {
                status: 200,
                data: json!({
                    "id": CREATED_PAGE_ID,
                    "url": format!("https://www.notion.so/Note-{CREATED_PAGE_ID}"),
                }),
            },
            delete_response: PageResponse {
                status: 200,
                data: json!({ "id": EXISTING_PAGE_ID, "archived": true }),
            },
            append_responses: Mutex::new(VecDeque::new()),
            database_body: json!({ "id": DATABASE_ID }),
            created_body: Mutex::new(None),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn created_body(&self) -> PageBody {
        self.created_body.lock().unwrap().clone().unwrap()
    }
}

#[async_trait::async_trait]
impl NotionBackend for FakeBackend {
    async fn create_page(&self, body: &PageBody) -> Result<PageResponse, AppError> {
        self.record("create".to_string());
        *self.created_body.lock().unwrap() = Some(body.clone());
        Ok(self.create_response.clone())
    }

    async fn append_children(
        &self,
        page: &PageId,
        children: &[Block],
    ) -> Result<PageResponse, AppError> {
        self.record(format!("append:{}:{}", page.as_str(), children.len()));
        let scripted = self.append_responses.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or(PageResponse {
            status: 200,
            data: json!({ "results": [] }),
        }))
    }

    async fn delete_page(&self, page: &PageId) -> Result<PageResponse, AppError> {
        self.record(format!("delete:{}", page.as_str()));
        Ok(self.delete_response.clone())
    }

    async fn retrieve_database(&self, database: &DatabaseId) -> Result<PageResponse, AppError> {
        self.record(format!("retrieve_db:{}", database.as_str()));
        Ok(PageResponse {
            status: 200,
            data: self.database_body.clone(),
        })
    }
}

fn general_target() -> DatabaseTarget {
    DatabaseTarget {
        format: TargetFormat::General,
        full_name: "Notes".to_string(),
        ab_name: "nt".to_string(),
        api_token: "secret_0123456789abcdef0123".to_string(),
        database_id: DATABASE_ID.to_string(),
        enable_tags: true,
        custom_title: false,
        custom_title_name: String::new(),
        custom_properties: Vec::new(),
    }
}

fn settings() -> SyncSettings {
    SyncSettings {
        banner_url: String::new(),
        notion_user: String::new(),
        store_link: true,
    }
}

fn general_request(body: &str, cover: &str) -> SyncRequest {
    SyncRequest::General {
        body: body.to_string(),
        fields: GeneralFields {
            title: "A Note".to_string(),
            tags: vec!["alpha".to_string()],
        },
        cover: cover.to_string(),
    }
}

/// A note body that converts into `count` paragraph blocks.
fn paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("paragraph number {i}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn existing_id() -> PageId {
    PageId::parse(EXISTING_PAGE_ID).unwrap()
}

#[tokio::test]
async fn update_deletes_old_page_exactly_once_before_creating() {
    let backend = FakeBackend::new();
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello world", "https://img.example/c.png");
    let response = uploader.sync(&request, Some(&existing_id())).await.unwrap();

    assert!(response.is_success());
    let calls = backend.calls();
    assert_eq!(
        calls,
        vec![format!("delete:{EXISTING_PAGE_ID}"), "create".to_string()]
    );
}

#[tokio::test]
async fn update_deletes_even_when_creation_is_rejected() {
    let mut backend = FakeBackend::new();
    backend.create_response = PageResponse {
        status: 400,
        data: json!({ "code": "validation_error", "message": "bad body" }),
    };
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello world", "https://img.example/c.png");
    let response = uploader.sync(&request, Some(&existing_id())).await.unwrap();

    assert_eq!(response.status, 400);
    let calls = backend.calls();
    assert_eq!(
        calls,
        vec![format!("delete:{EXISTING_PAGE_ID}"), "create".to_string()]
    );
}

#[tokio::test]
async fn failed_deletion_aborts_without_creating_a_duplicate() {
    let mut backend = FakeBackend::new();
    backend.delete_response = PageResponse {
        status: 404,
        data: json!({ "code": "object_not_found", "message": "gone" }),
    };
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello world", "");
    let response = uploader.sync(&request, Some(&existing_id())).await.unwrap();

    assert_eq!(response.status, 404);
    let calls = backend.calls();
    assert!(calls.iter().all(|c| !c.starts_with("create")));
}

#[tokio::test]
async fn long_note_appends_extra_chunks_of_at_most_one_request_each() {
    let backend = FakeBackend::new();
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    // 250 paragraphs: 100 ride along with creation, then 100 + 50.
    let request = general_request(&paragraphs(250), "");
    let response = uploader.sync(&request, None).await.unwrap();

    assert!(response.is_success());
    assert_eq!(backend.created_body().children.len(), 100);
    let calls = backend.calls();
    assert_eq!(
        calls,
        vec![
            "create".to_string(),
            format!("append:{CREATED_PAGE_ID}:100"),
            format!("append:{CREATED_PAGE_ID}:50"),
        ]
    );
}

#[tokio::test]
async fn rejected_append_does_not_stop_later_chunks_or_flip_the_outcome() {
    let backend = FakeBackend::new();
    backend.append_responses.lock().unwrap().push_back(PageResponse {
        status: 500,
        data: json!({ "code": "internal_server_error", "message": "boom" }),
    });
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request(&paragraphs(250), "");
    let response = uploader.sync(&request, None).await.unwrap();

    // First append was rejected; the second chunk is still sent and the
    // attempt still reports the creation's success.
    assert!(response.is_success());
    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], format!("append:{CREATED_PAGE_ID}:50"));
}

#[tokio::test]
async fn explicit_cover_wins_without_consulting_the_database() {
    let backend = FakeBackend::new();
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello", "https://img.example/explicit.png");
    uploader.sync(&request, Some(&existing_id())).await.unwrap();

    let body = backend.created_body();
    assert_eq!(
        body.cover.unwrap().external.url,
        "https://img.example/explicit.png"
    );
    assert!(backend
        .calls()
        .iter()
        .all(|c| !c.starts_with("retrieve_db")));
}

#[tokio::test]
async fn update_without_cover_reuses_the_database_cover() {
    let mut backend = FakeBackend::new();
    backend.database_body = json!({
        "id": DATABASE_ID,
        "cover": { "type": "external", "external": { "url": "https://img.example/db.png" } }
    });
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello", "");
    uploader.sync(&request, Some(&existing_id())).await.unwrap();

    let body = backend.created_body();
    assert_eq!(body.cover.unwrap().external.url, "https://img.example/db.png");
    assert!(backend
        .calls()
        .iter()
        .any(|c| c.starts_with("retrieve_db")));
}

#[tokio::test]
async fn new_page_without_cover_falls_back_to_the_banner() {
    let backend = FakeBackend::new();
    let target = general_target();
    let settings = SyncSettings {
        banner_url: "https://img.example/banner.png".to_string(),
        ..settings()
    };
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello", "");
    uploader.sync(&request, None).await.unwrap();

    let body = backend.created_body();
    assert_eq!(
        body.cover.unwrap().external.url,
        "https://img.example/banner.png"
    );
}

#[tokio::test]
async fn new_page_with_no_cover_and_no_banner_sends_none() {
    let backend = FakeBackend::new();
    let target = general_target();
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let request = general_request("hello", "");
    uploader.sync(&request, None).await.unwrap();

    assert!(backend.created_body().cover.is_none());
}

#[tokio::test]
async fn custom_body_omits_properties_without_front_matter_values() {
    let backend = FakeBackend::new();
    let mut target = general_target();
    target.format = TargetFormat::Custom;
    target.custom_title = true;
    target.custom_title_name = "Name".to_string();
    target.custom_properties = vec![
        CustomProperty {
            name: "Name".to_string(),
            kind: CustomPropertyKind::Title,
            position: 0,
        },
        CustomProperty {
            name: "Rating".to_string(),
            kind: CustomPropertyKind::Number,
            position: 1,
        },
        CustomProperty {
            name: "Topics".to_string(),
            kind: CustomPropertyKind::MultiSelect,
            position: 2,
        },
    ];
    let settings = settings();
    let converter = BasicConverter;
    let uploader = Uploader::new(&backend, &converter, &target, &settings);

    let mut values = Map::new();
    values.insert("Name".to_string(), json!("My Custom Note"));
    values.insert("Rating".to_string(), json!("4.5"));
    let request = SyncRequest::Custom {
        body: "hello custom".to_string(),
        values,
        cover: String::new(),
    };
    uploader.sync(&request, None).await.unwrap();

    let body = backend.created_body();
    assert!(body.properties.contains_key("Name"));
    assert_eq!(
        body.properties
            .get("Rating")
            .and_then(|p| p.pointer("/number"))
            .and_then(Value::as_f64),
        Some(4.5)
    );
    assert!(!body.properties.contains_key("Topics"));
}
