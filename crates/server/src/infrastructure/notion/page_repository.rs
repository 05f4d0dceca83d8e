use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::client::NotionHttpClient;
use super::mapping::{list_from_value, page_from_value};
use crate::domain::repository::{PageQueryOptions, PageQueryResult, PageRepository};
use crate::domain::{DatabaseId, DomainError, DomainResult, Page, PageId, PropertyMap};

/// [`PageRepository`] backed by the remote pages and database-query endpoints.
#[derive(Debug, Clone)]
pub struct NotionPageRepository {
    client: Arc<NotionHttpClient>,
}

impl NotionPageRepository {
    pub fn new(client: Arc<NotionHttpClient>) -> Self {
        Self { client }
    }
}

/// Request body for `POST /databases/{id}/query`; absent options are omitted.
fn query_body(options: PageQueryOptions) -> Value {
    let mut body = Map::new();
    if let Some(filter) = options.filter {
        body.insert("filter".to_string(), filter);
    }
    if let Some(sorts) = options.sorts {
        body.insert("sorts".to_string(), Value::Array(sorts));
    }
    if let Some(cursor) = options.start_cursor {
        body.insert("start_cursor".to_string(), Value::String(cursor));
    }
    if let Some(page_size) = options.page_size {
        body.insert("page_size".to_string(), json!(page_size));
    }
    Value::Object(body)
}

impl PageRepository for NotionPageRepository {
    async fn create(&self, database_id: &DatabaseId, properties: PropertyMap) -> DomainResult<Page> {
        const OPERATION: &str = "create page";
        let body = json!({
            "parent": { "database_id": database_id.as_str() },
            "properties": properties,
        });
        let response =
            self.client.post("/pages", body).await.map_err(|e| DomainError::remote(OPERATION, e))?;
        page_from_value(response, OPERATION)
    }

    async fn find_by_id(&self, id: &PageId) -> DomainResult<Option<Page>> {
        const OPERATION: &str = "retrieve page";
        match self.client.get(&format!("/pages/{id}")).await {
            Ok(response) => page_from_value(response, OPERATION).map(Some),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(DomainError::remote(OPERATION, error)),
        }
    }

    async fn query(
        &self,
        database_id: &DatabaseId,
        options: PageQueryOptions,
    ) -> DomainResult<PageQueryResult> {
        const OPERATION: &str = "query pages";
        let response = self
            .client
            .post(&format!("/databases/{database_id}/query"), query_body(options))
            .await
            .map_err(|e| DomainError::remote(OPERATION, e))?;

        let list = list_from_value(response, OPERATION)?;
        let pages = list
            .results
            .into_iter()
            .map(|result| page_from_value(result, OPERATION))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PageQueryResult { pages, has_more: list.has_more, next_cursor: list.next_cursor })
    }

    async fn update(&self, id: &PageId, properties: PropertyMap) -> DomainResult<Page> {
        const OPERATION: &str = "update page";
        let response = self
            .client
            .patch(&format!("/pages/{id}"), json!({ "properties": properties }))
            .await
            .map_err(|e| DomainError::remote(OPERATION, e))?;
        page_from_value(response, OPERATION)
    }

    async fn archive(&self, id: &PageId) -> DomainResult<()> {
        self.client
            .patch(&format!("/pages/{id}"), json!({ "archived": true }))
            .await
            .map(|_| ())
            .map_err(|e| DomainError::remote("archive page", e))
    }
}
