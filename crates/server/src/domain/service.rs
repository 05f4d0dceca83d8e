// Operations spanning several repository calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::repository::{DatabaseRepository, PageQueryOptions, PageRepository};
use super::{DatabaseId, DomainError, DomainResult, Page, PageId};

/// Page size used when draining a database.
pub const DRAIN_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub id: String,
    pub title: String,
}

/// Page counts for one database. `total_pages == archived_pages + active_pages`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatistics {
    pub database: DatabaseSummary,
    pub total_pages: usize,
    pub archived_pages: usize,
    pub active_pages: usize,
}

pub struct NotionService<P, D> {
    pages: Arc<P>,
    databases: Arc<D>,
}

impl<P, D> Clone for NotionService<P, D> {
    fn clone(&self) -> Self {
        Self { pages: Arc::clone(&self.pages), databases: Arc::clone(&self.databases) }
    }
}

impl<P: PageRepository, D: DatabaseRepository> NotionService<P, D> {
    pub fn new(pages: Arc<P>, databases: Arc<D>) -> Self {
        Self { pages, databases }
    }

    /// Follows the query cursor until the remote reports no more results.
    ///
    /// There is no iteration cap: termination relies on the remote honouring
    /// its `has_more`/`next_cursor` contract.
    pub async fn get_all_pages_in_database(&self, database_id: &DatabaseId) -> DomainResult<Vec<Page>> {
        let mut pages = Vec::new();
        let mut start_cursor = None;

        loop {
            let options = PageQueryOptions {
                start_cursor: start_cursor.take(),
                page_size: Some(DRAIN_PAGE_SIZE),
                ..PageQueryOptions::default()
            };
            let result = self.pages.query(database_id, options).await?;
            debug!(
                database_id = %database_id,
                fetched = result.pages.len(),
                has_more = result.has_more,
                "drained query page"
            );
            pages.extend(result.pages);

            if !result.has_more {
                return Ok(pages);
            }
            start_cursor = result.next_cursor;
        }
    }

    /// Creates a copy of the page, with its current properties, in the same
    /// database.
    pub async fn duplicate_page(&self, page_id: &PageId) -> DomainResult<Page> {
        let original = self
            .pages
            .find_by_id(page_id)
            .await?
            .ok_or_else(|| DomainError::PageNotFound(page_id.to_string()))?;

        let database_id = original.parent_database_id().ok_or(DomainError::NoParentDatabase)?;
        self.pages.create(database_id, original.properties().clone()).await
    }

    /// Archives every active page and returns how many were archived. Pages
    /// already archived are skipped. Not atomic: an error leaves earlier
    /// archives in place.
    pub async fn archive_all_pages_in_database(&self, database_id: &DatabaseId) -> DomainResult<usize> {
        let pages = self.get_all_pages_in_database(database_id).await?;
        let mut archived = 0;

        for page in pages.iter().filter(|page| !page.archived()) {
            self.pages.archive(page.id()).await?;
            archived += 1;
        }

        Ok(archived)
    }

    pub async fn get_database_statistics(
        &self,
        database_id: &DatabaseId,
    ) -> DomainResult<DatabaseStatistics> {
        let database = self
            .databases
            .find_by_id(database_id)
            .await?
            .ok_or_else(|| DomainError::DatabaseNotFound(database_id.to_string()))?;

        let pages = self.get_all_pages_in_database(database_id).await?;
        let archived_pages = pages.iter().filter(|page| page.archived()).count();

        Ok(DatabaseStatistics {
            database: DatabaseSummary {
                id: database.id().to_string(),
                title: database.title().to_string(),
            },
            total_pages: pages.len(),
            archived_pages,
            active_pages: pages.len() - archived_pages,
        })
    }
}
