// Remote workspace adapter: HTTP client, payload mapping and repositories.

pub mod client;
pub mod database_repository;
pub mod mapping;
pub mod page_repository;

pub use client::{NotionApiError, NotionClientConfig, NotionHttpClient};
pub use database_repository::NotionDatabaseRepository;
pub use page_repository::NotionPageRepository;
