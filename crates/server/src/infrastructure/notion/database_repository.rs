use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::client::NotionHttpClient;
use super::mapping::{database_from_value, list_from_value};
use crate::domain::repository::{DatabaseRepository, DatabaseUpdate};
use crate::domain::{Database, DatabaseId, DomainError, DomainResult};

const SEARCH_PAGE_SIZE: u32 = 100;

/// [`DatabaseRepository`] backed by the remote databases and search endpoints.
#[derive(Debug, Clone)]
pub struct NotionDatabaseRepository {
    client: Arc<NotionHttpClient>,
}

impl NotionDatabaseRepository {
    pub fn new(client: Arc<NotionHttpClient>) -> Self {
        Self { client }
    }
}

fn search_body(start_cursor: Option<String>) -> Value {
    let mut body = json!({
        "filter": { "property": "object", "value": "database" },
        "page_size": SEARCH_PAGE_SIZE,
    });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor);
    }
    body
}

/// Request body for `PATCH /databases/{id}`. The title becomes a single
/// text rich-text item and is left out when blank; the schema is sent as
/// `properties`.
fn update_body(update: DatabaseUpdate) -> Value {
    let mut body = Map::new();
    if let Some(title) = update.title.filter(|title| !title.trim().is_empty()) {
        body.insert(
            "title".to_string(),
            json!([{ "type": "text", "text": { "content": title } }]),
        );
    }
    if let Some(schema) = update.schema {
        body.insert("properties".to_string(), Value::Object(schema));
    }
    Value::Object(body)
}

impl DatabaseRepository for NotionDatabaseRepository {
    async fn find_by_id(&self, id: &DatabaseId) -> DomainResult<Option<Database>> {
        const OPERATION: &str = "retrieve database";
        match self.client.get(&format!("/databases/{id}")).await {
            Ok(response) => database_from_value(response, OPERATION).map(Some),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(DomainError::remote(OPERATION, error)),
        }
    }

    async fn find_all(&self) -> DomainResult<Vec<Database>> {
        const OPERATION: &str = "retrieve databases";
        let mut databases = Vec::new();
        let mut start_cursor = None;

        loop {
            let response = self
                .client
                .post("/search", search_body(start_cursor.take()))
                .await
                .map_err(|e| DomainError::remote(OPERATION, e))?;
            let list = list_from_value(response, OPERATION)?;
            debug!(fetched = list.results.len(), has_more = list.has_more, "database search page");

            for result in list.results {
                databases.push(database_from_value(result, OPERATION)?);
            }
            if !list.has_more {
                return Ok(databases);
            }
            start_cursor = list.next_cursor;
        }
    }

    async fn update(&self, id: &DatabaseId, update: DatabaseUpdate) -> DomainResult<Database> {
        const OPERATION: &str = "update database";
        let body = update_body(update);
        let response = self
            .client
            .patch(&format!("/databases/{id}"), body)
            .await
            .map_err(|e| DomainError::remote(OPERATION, e))?;
        database_from_value(response, OPERATION)
    }

    async fn archive(&self, id: &DatabaseId) -> DomainResult<()> {
        self.client
            .patch(&format!("/databases/{id}"), json!({ "archived": true }))
            .await
            .map(|_| ())
            .map_err(|e| DomainError::remote("archive database", e))
    }
}
