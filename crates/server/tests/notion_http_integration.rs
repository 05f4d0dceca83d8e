use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use notion_mcp_server::domain::repository::{
    DatabaseRepository, DatabaseUpdate, PageQueryOptions, PageRepository,
};
use notion_mcp_server::domain::service::NotionService;
use notion_mcp_server::domain::{DatabaseId, DomainError, PageId};
use notion_mcp_server::infrastructure::notion::{
    NotionClientConfig, NotionDatabaseRepository, NotionHttpClient, NotionPageRepository,
};
use notion_mcp_server::rpc::McpServerState;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

const API_KEY: &str = "secret_integration";
const DATABASE: &str = "d9824bdc-8445-4327-be8b-5b47500af6ce";
const PAGE: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
const MISSING_PAGE: &str = "00000000000000000000000000000000";
const CREATED_PAGE: &str = "11111111-2222-3333-4444-555555555555";

#[derive(Default)]
struct Recorded {
    requests: Vec<(String, Value)>,
}

type Shared = Arc<Mutex<Recorded>>;

fn remote_page(id: &str, properties: Value, archived: bool) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2024-01-02T03:04:05.000Z",
        "last_edited_time": "2024-01-02T03:04:05.000Z",
        "parent": { "type": "database_id", "database_id": DATABASE },
        "archived": archived,
        "properties": properties
    })
}

fn remote_database(id: &str, title: &str) -> Value {
    json!({
        "object": "database",
        "id": id,
        "created_time": "2023-05-06T07:08:09.000Z",
        "last_edited_time": "2023-05-06T07:08:09.000Z",
        "title": [{ "type": "text", "plain_text": title }],
        "properties": { "Name": { "id": "title", "name": "Name", "type": "title", "title": {} } },
        "archived": false
    })
}

fn not_found(id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": format!("Could not find object with ID: {id}.")
        })),
    )
}

fn record(state: &Shared, route: impl Into<String>, body: Value) {
    state.lock().expect("recorder lock").requests.push((route.into(), body));
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers.get("authorization").and_then(|value| value.to_str().ok());
    let version = headers.get("notion-version").and_then(|value| value.to_str().ok());
    bearer == Some(format!("Bearer {API_KEY}").as_str()) && version == Some("2022-06-28")
}

fn router(state: Shared) -> Router {
    Router::new()
        .route(
            "/v1/users/me",
            get(|headers: HeaderMap| async move {
                if authorized(&headers) {
                    (StatusCode::OK, Json(json!({ "object": "user", "type": "bot" })))
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({
                            "object": "error",
                            "status": 401,
                            "code": "unauthorized",
                            "message": "API token is invalid."
                        })),
                    )
                }
            }),
        )
        .route(
            "/v1/pages",
            post(|State(state): State<Shared>, Json(body): Json<Value>| async move {
                record(&state, "POST /pages", body.clone());
                Json(remote_page(CREATED_PAGE, body["properties"].clone(), false))
            }),
        )
        .route(
            "/v1/pages/{id}",
            get(|Path(id): Path<String>| async move {
                if id == MISSING_PAGE {
                    return not_found(&id);
                }
                (StatusCode::OK, Json(remote_page(&id, json!({ "Name": { "title": [] } }), false)))
            })
            .patch(
                |State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    record(&state, format!("PATCH /pages/{id}"), body.clone());
                    let archived = body["archived"].as_bool().unwrap_or(false);
                    let properties = body.get("properties").cloned().unwrap_or_else(|| json!({}));
                    Json(remote_page(&id, properties, archived))
                },
            ),
        )
        .route(
            "/v1/databases/{id}/query",
            post(
                |State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    record(&state, "POST /databases/query", body.clone());
                    if id != DATABASE {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "object": "error",
                                "status": 400,
                                "code": "validation_error",
                                "message": "Invalid request URL."
                            })),
                        );
                    }
                    let page = match body.get("start_cursor").and_then(Value::as_str) {
                        None => json!({
                            "object": "list",
                            "results": [
                                remote_page("aaaaaaaa-0000-0000-0000-000000000001", json!({}), false),
                                remote_page("aaaaaaaa-0000-0000-0000-000000000002", json!({}), true)
                            ],
                            "has_more": true,
                            "next_cursor": "c1"
                        }),
                        Some(_) => json!({
                            "object": "list",
                            "results": [remote_page("aaaaaaaa-0000-0000-0000-000000000003", json!({}), false)],
                            "has_more": false,
                            "next_cursor": null
                        }),
                    };
                    (StatusCode::OK, Json(page))
                },
            ),
        )
        .route(
            "/v1/databases/{id}",
            get(|Path(id): Path<String>| async move {
                if id != DATABASE {
                    return not_found(&id);
                }
                (StatusCode::OK, Json(remote_database(&id, "Tasks")))
            })
            .patch(
                |State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                    record(&state, "PATCH /databases", body.clone());
                    let title = body["title"][0]["text"]["content"].as_str().unwrap_or("Tasks").to_string();
                    Json(remote_database(&id, &title))
                },
            ),
        )
        .route(
            "/v1/search",
            post(|State(state): State<Shared>, Json(body): Json<Value>| async move {
                record(&state, "POST /search", body.clone());
                match body.get("start_cursor").and_then(Value::as_str) {
                    None => Json(json!({
                        "results": [remote_database(DATABASE, "Tasks")],
                        "has_more": true,
                        "next_cursor": "s1"
                    })),
                    Some(_) => Json(json!({
                        "results": [remote_database("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "Notes")],
                        "has_more": false,
                        "next_cursor": null
                    })),
                }
            }),
        )
        .with_state(state)
}

struct FakeNotion {
    client: Arc<NotionHttpClient>,
    recorded: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl FakeNotion {
    async fn start(api_key: &str) -> Self {
        let recorded = Shared::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
        let addr = listener.local_addr().expect("listener should expose local address");
        let app = router(Arc::clone(&recorded));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake notion api should run");
        });

        let client = NotionHttpClient::new(NotionClientConfig {
            api_key: api_key.to_string(),
            base_url: Url::parse(&format!("http://{addr}/v1/")).expect("base url should parse"),
            notion_version: "2022-06-28".to_string(),
            timeout: None,
        })
        .expect("client should build");

        Self { client: Arc::new(client), recorded, server }
    }

    fn pages(&self) -> Arc<NotionPageRepository> {
        Arc::new(NotionPageRepository::new(Arc::clone(&self.client)))
    }

    fn databases(&self) -> Arc<NotionDatabaseRepository> {
        Arc::new(NotionDatabaseRepository::new(Arc::clone(&self.client)))
    }

    fn requests(&self, route: &str) -> Vec<Value> {
        self.recorded
            .lock()
            .expect("recorder lock")
            .requests
            .iter()
            .filter(|(recorded, _)| recorded == route)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Drop for FakeNotion {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[tokio::test]
async fn api_key_validation_uses_bearer_and_version_headers() {
    let accepted = FakeNotion::start(API_KEY).await;
    assert!(accepted.client.validate_api_key().await);

    let rejected = FakeNotion::start("secret_wrong").await;
    assert!(!rejected.client.validate_api_key().await);
}

#[tokio::test]
async fn page_lifecycle_round_trips_over_http() {
    let fake = FakeNotion::start(API_KEY).await;
    let pages = fake.pages();
    let database_id = DatabaseId::new(DATABASE).unwrap();

    let properties = json!({ "Name": { "title": [{ "text": { "content": "Ship" } }] } });
    let created = pages
        .create(&database_id, properties.as_object().cloned().unwrap())
        .await
        .expect("create should succeed");
    assert_eq!(created.id().as_str(), CREATED_PAGE);
    assert_eq!(created.parent_database_id(), Some(&database_id));
    assert_eq!(
        fake.requests("POST /pages"),
        [json!({ "parent": { "database_id": DATABASE }, "properties": properties })]
    );

    let fetched = pages.find_by_id(&PageId::new(PAGE).unwrap()).await.unwrap();
    assert_eq!(fetched.expect("page should exist").id().as_str(), PAGE);

    pages.delete(&PageId::new(PAGE).unwrap()).await.expect("delete should archive");
    assert_eq!(fake.requests(&format!("PATCH /pages/{PAGE}")), [json!({ "archived": true })]);
}

#[tokio::test]
async fn missing_page_is_none_not_error() {
    let fake = FakeNotion::start(API_KEY).await;
    let found = fake.pages().find_by_id(&PageId::new(MISSING_PAGE).unwrap()).await;
    assert_eq!(found.map(|page| page.is_none()), Ok(true));
}

#[tokio::test]
async fn remote_errors_keep_their_message() {
    let fake = FakeNotion::start(API_KEY).await;
    let unknown = DatabaseId::new("cccccccccccccccccccccccccccccccc").unwrap();

    let error = fake
        .pages()
        .query(&unknown, PageQueryOptions::default())
        .await
        .expect_err("query on an unknown database should fail");

    assert_eq!(error.to_string(), "Failed to query pages: Invalid request URL.");
}

#[tokio::test]
async fn query_pages_forwards_only_present_options() {
    let fake = FakeNotion::start(API_KEY).await;
    let database_id = DatabaseId::new(DATABASE).unwrap();

    let result = fake
        .pages()
        .query(&database_id, PageQueryOptions { page_size: Some(2), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert!(result.has_more);
    assert_eq!(result.next_cursor.as_deref(), Some("c1"));
    assert_eq!(fake.requests("POST /databases/query"), [json!({ "page_size": 2 })]);
}

#[tokio::test]
async fn service_drains_remote_query_pagination() {
    let fake = FakeNotion::start(API_KEY).await;
    let service = NotionService::new(fake.pages(), fake.databases());
    let database_id = DatabaseId::new(DATABASE).unwrap();

    let stats = service.get_database_statistics(&database_id).await.unwrap();
    assert_eq!((stats.total_pages, stats.archived_pages, stats.active_pages), (3, 1, 2));
    assert_eq!(stats.database.title, "Tasks");
    assert_eq!(
        fake.requests("POST /databases/query"),
        [json!({ "page_size": 100 }), json!({ "page_size": 100, "start_cursor": "c1" })]
    );
}

#[tokio::test]
async fn list_databases_drains_search() {
    let fake = FakeNotion::start(API_KEY).await;

    let titles: Vec<String> = fake
        .databases()
        .find_all()
        .await
        .unwrap()
        .iter()
        .map(|database| database.title().to_string())
        .collect();

    assert_eq!(titles, ["Tasks", "Notes"]);
    let searches = fake.requests("POST /search");
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0]["filter"], json!({ "property": "object", "value": "database" }));
    assert_eq!(searches[1]["start_cursor"], "s1");
}

#[tokio::test]
async fn database_update_sends_rich_text_title() {
    let fake = FakeNotion::start(API_KEY).await;
    let databases = fake.databases();
    let database_id = DatabaseId::new(DATABASE).unwrap();

    let updated = databases
        .update(&database_id, DatabaseUpdate { title: Some("Sprint".to_string()), schema: None })
        .await
        .unwrap();
    assert_eq!(updated.title(), "Sprint");
    assert_eq!(
        fake.requests("PATCH /databases"),
        [json!({ "title": [{ "type": "text", "text": { "content": "Sprint" } }] })]
    );
}

#[tokio::test]
async fn database_update_with_empty_title_sends_only_schema() {
    let fake = FakeNotion::start(API_KEY).await;
    let database_id = DatabaseId::new(DATABASE).unwrap();
    let schema = json!({ "Due": { "date": {} } }).as_object().unwrap().clone();

    fake.databases()
        .update(&database_id, DatabaseUpdate { title: Some(String::new()), schema: Some(schema) })
        .await
        .unwrap();
    assert_eq!(
        fake.requests("PATCH /databases"),
        [json!({ "properties": { "Due": { "date": {} } } })]
    );
}

#[tokio::test]
async fn missing_database_is_none_and_statistics_fail() {
    let fake = FakeNotion::start(API_KEY).await;
    let missing = DatabaseId::new("cccccccccccccccccccccccccccccccc").unwrap();

    assert_eq!(fake.databases().find_by_id(&missing).await.map(|found| found.is_none()), Ok(true));

    let service = NotionService::new(fake.pages(), fake.databases());
    let error = service.get_database_statistics(&missing).await.expect_err("should fail");
    assert!(matches!(error, DomainError::DatabaseNotFound(_)));
}

#[tokio::test]
async fn tool_call_end_to_end_over_http() {
    let fake = FakeNotion::start(API_KEY).await;
    let state = McpServerState::from_repositories(fake.pages(), fake.databases());

    let raw = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "get_database", "arguments": { "databaseId": DATABASE } }
    })
    .to_string();
    let response = notion_mcp_server::rpc::methods::handle_raw_request(raw.as_bytes(), &state)
        .await
        .expect("request should get a response");

    let result = response.result.expect("tool result");
    assert_eq!(result.get("isError"), None);
    let rendered: Value =
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(rendered["title"], "Tasks");
    assert_eq!(rendered["createdTime"], "2023-05-06T07:08:09.000Z");
    assert_eq!(rendered["schema"]["Name"]["type"], "title");
}
