// Success text for tool results: pretty JSON with a fixed key order per tool.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::application::ArchivedPages;
use crate::domain::repository::PageQueryResult;
use crate::domain::service::DatabaseStatistics;
use crate::domain::{Database, DatabaseSchema, Page, PropertyMap};

pub const PAGE_NOT_FOUND: &str = "Page not found";
pub const DATABASE_NOT_FOUND: &str = "Database not found";
pub const PAGE_DELETED: &str = "Page deleted successfully";

type RenderResult = Result<String, serde_json::Error>;

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn pretty<T: Serialize>(view: &T) -> RenderResult {
    serde_json::to_string_pretty(view)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPageView<'a> {
    id: &'a str,
    properties: &'a PropertyMap,
    created_time: String,
    last_edited_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView<'a> {
    id: &'a str,
    properties: &'a PropertyMap,
    created_time: String,
    last_edited_time: String,
    archived: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedPageView<'a> {
    id: &'a str,
    properties: &'a PropertyMap,
    last_edited_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueriedPageView<'a> {
    id: &'a str,
    properties: &'a PropertyMap,
    created_time: String,
    archived: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryView<'a> {
    pages: Vec<QueriedPageView<'a>>,
    has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseView<'a> {
    id: &'a str,
    title: &'a str,
    schema: &'a DatabaseSchema,
    created_time: String,
    last_edited_time: String,
    archived: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedDatabaseView<'a> {
    id: &'a str,
    title: &'a str,
    created_time: String,
    archived: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedDatabaseView<'a> {
    id: &'a str,
    title: &'a str,
    schema: &'a DatabaseSchema,
    last_edited_time: String,
}

/// `create_page` and `duplicate_page`.
pub fn created_page(page: &Page) -> RenderResult {
    pretty(&CreatedPageView {
        id: page.id().as_str(),
        properties: page.properties(),
        created_time: timestamp(page.created_time()),
        last_edited_time: timestamp(page.last_edited_time()),
    })
}

pub fn page(page: Option<&Page>) -> RenderResult {
    let Some(page) = page else {
        return Ok(PAGE_NOT_FOUND.to_string());
    };
    pretty(&PageView {
        id: page.id().as_str(),
        properties: page.properties(),
        created_time: timestamp(page.created_time()),
        last_edited_time: timestamp(page.last_edited_time()),
        archived: page.archived(),
    })
}

pub fn updated_page(page: &Page) -> RenderResult {
    pretty(&UpdatedPageView {
        id: page.id().as_str(),
        properties: page.properties(),
        last_edited_time: timestamp(page.last_edited_time()),
    })
}

pub fn query_result(result: &PageQueryResult) -> RenderResult {
    pretty(&QueryView {
        pages: result
            .pages
            .iter()
            .map(|page| QueriedPageView {
                id: page.id().as_str(),
                properties: page.properties(),
                created_time: timestamp(page.created_time()),
                archived: page.archived(),
            })
            .collect(),
        has_more: result.has_more,
        next_cursor: result.next_cursor.as_deref(),
    })
}

pub fn database(database: Option<&Database>) -> RenderResult {
    let Some(database) = database else {
        return Ok(DATABASE_NOT_FOUND.to_string());
    };
    pretty(&DatabaseView {
        id: database.id().as_str(),
        title: database.title(),
        schema: database.schema(),
        created_time: timestamp(database.created_time()),
        last_edited_time: timestamp(database.last_edited_time()),
        archived: database.archived(),
    })
}

pub fn database_list(databases: &[Database]) -> RenderResult {
    let views: Vec<ListedDatabaseView<'_>> = databases
        .iter()
        .map(|database| ListedDatabaseView {
            id: database.id().as_str(),
            title: database.title(),
            created_time: timestamp(database.created_time()),
            archived: database.archived(),
        })
        .collect();
    pretty(&views)
}

pub fn updated_database(database: &Database) -> RenderResult {
    pretty(&UpdatedDatabaseView {
        id: database.id().as_str(),
        title: database.title(),
        schema: database.schema(),
        last_edited_time: timestamp(database.last_edited_time()),
    })
}

pub fn archived_pages(archived: &ArchivedPages) -> RenderResult {
    pretty(archived)
}

pub fn statistics(statistics: &DatabaseStatistics) -> RenderResult {
    pretty(statistics)
}
