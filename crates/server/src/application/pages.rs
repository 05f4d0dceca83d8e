// Page use cases. Each one builds identifiers from the raw inputs and makes
// exactly one repository or service call.

use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::repository::{
    DatabaseRepository, PageQueryOptions, PageQueryResult, PageRepository,
};
use crate::domain::service::NotionService;
use crate::domain::{DatabaseId, DomainResult, Page, PageId, PropertyMap};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageInput {
    pub database_id: String,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIdInput {
    pub page_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageInput {
    pub page_id: String,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPagesInput {
    pub database_id: String,
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub sorts: Option<Vec<Value>>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default, deserialize_with = "whole_number")]
    pub page_size: Option<u32>,
}

/// Accepts any JSON number with no fractional part, so `50` and `50.0`
/// decode alike.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let Some(number) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if number.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&number) {
        return Err(D::Error::custom(format!("expected a whole number, got {number}")));
    }
    Ok(Some(number as u32))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseIdInput {
    pub database_id: String,
}

/// Result of archiving every active page of a database.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedPages {
    pub database_id: String,
    pub archived_count: usize,
}

pub struct CreatePage<P> {
    pages: Arc<P>,
}

impl<P: PageRepository> CreatePage<P> {
    pub fn new(pages: Arc<P>) -> Self {
        Self { pages }
    }

    pub async fn execute(&self, input: CreatePageInput) -> DomainResult<Page> {
        let database_id = DatabaseId::new(input.database_id)?;
        self.pages.create(&database_id, input.properties).await
    }
}

pub struct GetPage<P> {
    pages: Arc<P>,
}

impl<P: PageRepository> GetPage<P> {
    pub fn new(pages: Arc<P>) -> Self {
        Self { pages }
    }

    /// `Ok(None)` when the page does not exist.
    pub async fn execute(&self, input: PageIdInput) -> DomainResult<Option<Page>> {
        let page_id = PageId::new(input.page_id)?;
        self.pages.find_by_id(&page_id).await
    }
}

pub struct UpdatePage<P> {
    pages: Arc<P>,
}

impl<P: PageRepository> UpdatePage<P> {
    pub fn new(pages: Arc<P>) -> Self {
        Self { pages }
    }

    pub async fn execute(&self, input: UpdatePageInput) -> DomainResult<Page> {
        let page_id = PageId::new(input.page_id)?;
        self.pages.update(&page_id, input.properties).await
    }
}

pub struct DeletePage<P> {
    pages: Arc<P>,
}

impl<P: PageRepository> DeletePage<P> {
    pub fn new(pages: Arc<P>) -> Self {
        Self { pages }
    }

    pub async fn execute(&self, input: PageIdInput) -> DomainResult<()> {
        let page_id = PageId::new(input.page_id)?;
        self.pages.delete(&page_id).await
    }
}

pub struct QueryPages<P> {
    pages: Arc<P>,
}

impl<P: PageRepository> QueryPages<P> {
    pub fn new(pages: Arc<P>) -> Self {
        Self { pages }
    }

    pub async fn execute(&self, input: QueryPagesInput) -> DomainResult<PageQueryResult> {
        let database_id = DatabaseId::new(input.database_id)?;
        let options = PageQueryOptions {
            filter: input.filter,
            sorts: input.sorts,
            start_cursor: input.start_cursor,
            page_size: input.page_size,
        };
        self.pages.query(&database_id, options).await
    }
}

pub struct DuplicatePage<P, D> {
    service: NotionService<P, D>,
}

impl<P: PageRepository, D: DatabaseRepository> DuplicatePage<P, D> {
    pub fn new(service: NotionService<P, D>) -> Self {
        Self { service }
    }

    pub async fn execute(&self, input: PageIdInput) -> DomainResult<Page> {
        let page_id = PageId::new(input.page_id)?;
        self.service.duplicate_page(&page_id).await
    }
}

pub struct ArchiveAllPages<P, D> {
    service: NotionService<P, D>,
}

impl<P: PageRepository, D: DatabaseRepository> ArchiveAllPages<P, D> {
    pub fn new(service: NotionService<P, D>) -> Self {
        Self { service }
    }

    pub async fn execute(&self, input: DatabaseIdInput) -> DomainResult<ArchivedPages> {
        let database_id = DatabaseId::new(input.database_id)?;
        let archived_count = self.service.archive_all_pages_in_database(&database_id).await?;
        Ok(ArchivedPages { database_id: database_id.to_string(), archived_count })
    }
}
