// Remote payload → entity mapping.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::database::schema_from_map;
use crate::domain::{Database, DatabaseId, DomainError, DomainResult, Page, PageId, PropertyMap};

pub const UNTITLED: &str = "Untitled";
const DATABASE_PARENT: &str = "database_id";

#[derive(Debug, Deserialize)]
struct RemoteParent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    database_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemotePage {
    id: String,
    #[serde(default)]
    parent: Option<RemoteParent>,
    #[serde(default)]
    properties: Option<PropertyMap>,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    #[serde(default)]
    archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    #[serde(default)]
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct RemoteDatabase {
    id: String,
    #[serde(default)]
    title: Option<Vec<RichText>>,
    #[serde(default)]
    properties: Option<PropertyMap>,
    created_time: DateTime<Utc>,
    last_edited_time: DateTime<Utc>,
    #[serde(default)]
    archived: Option<bool>,
}

/// A paginated list envelope (`results`, `has_more`, `next_cursor`).
#[derive(Debug, Deserialize)]
pub struct RemoteList {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

fn decode<T: DeserializeOwned>(value: Value, operation: &'static str) -> DomainResult<T> {
    serde_json::from_value(value)
        .map_err(|error| DomainError::remote(operation, format!("unexpected response shape: {error}")))
}

pub fn list_from_value(value: Value, operation: &'static str) -> DomainResult<RemoteList> {
    decode(value, operation)
}

/// Builds a [`Page`]. The owning database is set only for `database_id`
/// parents.
pub fn page_from_value(value: Value, operation: &'static str) -> DomainResult<Page> {
    let remote: RemotePage = decode(value, operation)?;

    let parent_database_id = match remote.parent {
        Some(RemoteParent { kind, database_id: Some(id) }) if kind == DATABASE_PARENT => {
            Some(DatabaseId::new(id)?)
        }
        _ => None,
    };

    Ok(Page::new(
        PageId::new(remote.id)?,
        parent_database_id,
        remote.properties.unwrap_or_default(),
        remote.created_time,
        remote.last_edited_time,
    )
    .with_archived(remote.archived.unwrap_or(false)))
}

pub fn database_from_value(value: Value, operation: &'static str) -> DomainResult<Database> {
    let remote: RemoteDatabase = decode(value, operation)?;

    let title = remote
        .title
        .map(|pieces| pieces.into_iter().map(|piece| piece.plain_text).collect::<String>())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    Ok(Database::new(
        DatabaseId::new(remote.id)?,
        title,
        schema_from_map(remote.properties.unwrap_or_default()),
        remote.created_time,
        remote.last_edited_time,
    )
    .with_archived(remote.archived.unwrap_or(false)))
}
