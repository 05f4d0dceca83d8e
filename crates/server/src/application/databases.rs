// Database use cases.

use std::sync::Arc;

use serde::Deserialize;

use super::pages::DatabaseIdInput;
use crate::domain::repository::{DatabaseRepository, DatabaseUpdate, PageRepository};
use crate::domain::service::{DatabaseStatistics, NotionService};
use crate::domain::{Database, DatabaseId, DomainResult, PropertyMap};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatabaseInput {
    pub database_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub schema: Option<PropertyMap>,
}

pub struct GetDatabase<D> {
    databases: Arc<D>,
}

impl<D: DatabaseRepository> GetDatabase<D> {
    pub fn new(databases: Arc<D>) -> Self {
        Self { databases }
    }

    /// `Ok(None)` when the database does not exist.
    pub async fn execute(&self, input: DatabaseIdInput) -> DomainResult<Option<Database>> {
        let database_id = DatabaseId::new(input.database_id)?;
        self.databases.find_by_id(&database_id).await
    }
}

pub struct ListDatabases<D> {
    databases: Arc<D>,
}

impl<D: DatabaseRepository> ListDatabases<D> {
    pub fn new(databases: Arc<D>) -> Self {
        Self { databases }
    }

    pub async fn execute(&self) -> DomainResult<Vec<Database>> {
        self.databases.find_all().await
    }
}

pub struct UpdateDatabase<D> {
    databases: Arc<D>,
}

impl<D: DatabaseRepository> UpdateDatabase<D> {
    pub fn new(databases: Arc<D>) -> Self {
        Self { databases }
    }

    pub async fn execute(&self, input: UpdateDatabaseInput) -> DomainResult<Database> {
        let database_id = DatabaseId::new(input.database_id)?;
        let update = DatabaseUpdate { title: input.title, schema: input.schema };
        self.databases.update(&database_id, update).await
    }
}

pub struct GetDatabaseStatistics<P, D> {
    service: NotionService<P, D>,
}

impl<P: PageRepository, D: DatabaseRepository> GetDatabaseStatistics<P, D> {
    pub fn new(service: NotionService<P, D>) -> Self {
        Self { service }
    }

    pub async fn execute(&self, input: DatabaseIdInput) -> DomainResult<DatabaseStatistics> {
        let database_id = DatabaseId::new(input.database_id)?;
        self.service.get_database_statistics(&database_id).await
    }
}
