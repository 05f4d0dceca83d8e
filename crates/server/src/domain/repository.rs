// Repository ports. The remote workspace adapter and the in-memory adapter
// implement these; everything above the infrastructure layer depends only
// on the traits.

use serde_json::Value;

use super::{Database, DatabaseId, DomainResult, Page, PageId, PropertyMap};

/// Options for a single page of a database query. Filter and sorts are
/// forwarded to the remote API as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQueryOptions {
    pub filter: Option<Value>,
    pub sorts: Option<Vec<Value>>,
    pub start_cursor: Option<String>,
    pub page_size: Option<u32>,
}

/// One page of query results plus the continuation contract.
#[derive(Debug, Clone, Default)]
pub struct PageQueryResult {
    pub pages: Vec<Page>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Fields of a database update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseUpdate {
    pub title: Option<String>,
    pub schema: Option<PropertyMap>,
}

#[allow(async_fn_in_trait)]
pub trait PageRepository {
    async fn create(&self, database_id: &DatabaseId, properties: PropertyMap) -> DomainResult<Page>;

    /// `Ok(None)` when the remote reports the page does not exist.
    async fn find_by_id(&self, id: &PageId) -> DomainResult<Option<Page>>;

    async fn query(
        &self,
        database_id: &DatabaseId,
        options: PageQueryOptions,
    ) -> DomainResult<PageQueryResult>;

    async fn update(&self, id: &PageId, properties: PropertyMap) -> DomainResult<Page>;

    async fn archive(&self, id: &PageId) -> DomainResult<()>;

    /// The remote system has no hard delete; this archives.
    async fn delete(&self, id: &PageId) -> DomainResult<()> {
        self.archive(id).await
    }
}

#[allow(async_fn_in_trait)]
pub trait DatabaseRepository {
    /// `Ok(None)` when the remote reports the database does not exist.
    async fn find_by_id(&self, id: &DatabaseId) -> DomainResult<Option<Database>>;

    async fn find_all(&self) -> DomainResult<Vec<Database>>;

    async fn update(&self, id: &DatabaseId, update: DatabaseUpdate) -> DomainResult<Database>;

    async fn archive(&self, id: &DatabaseId) -> DomainResult<()>;
}
