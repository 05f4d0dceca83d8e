// Domain layer: identifiers, entities, repository ports and the aggregation service.

pub mod database;
pub mod error;
pub mod ids;
pub mod page;
pub mod repository;
pub mod service;

pub use database::{Database, DatabaseSchema, PropertyDescriptor};
pub use error::{DomainError, DomainResult};
pub use ids::{DatabaseId, PageId};
pub use page::Page;

/// Opaque property bag: remote property payloads pass through untouched.
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Next `last_edited_time` for a mutation: wall clock, but never at or
/// before the previous value.
pub(crate) fn next_edit_time(
    previous: chrono::DateTime<chrono::Utc>,
) -> chrono::DateTime<chrono::Utc> {
    let now = chrono::Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::nanoseconds(1)
    }
}
