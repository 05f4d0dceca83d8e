// Tool descriptors advertised by `tools/list`.

use notion_mcp_common::protocol::mcp_methods::{
    ARCHIVE_ALL_PAGES, CREATE_PAGE, DELETE_PAGE, DUPLICATE_PAGE, GET_DATABASE,
    GET_DATABASE_STATISTICS, GET_PAGE, LIST_DATABASES, QUERY_PAGES, UPDATE_DATABASE, UPDATE_PAGE,
};
use notion_mcp_common::types::ToolDescriptor;
use serde_json::{json, Map, Value};

const DATABASE_ID: (&str, &str, &str) = ("databaseId", "string", "Database ID (32 hex digits or UUID)");
const PAGE_ID: (&str, &str, &str) = ("pageId", "string", "Page ID (32 hex digits or UUID)");

fn descriptor(
    name: &str,
    description: &str,
    required: &[(&str, &str, &str)],
    optional: &[(&str, &str, &str)],
) -> ToolDescriptor {
    let mut properties = Map::new();
    for (field, kind, help) in required.iter().chain(optional) {
        properties.insert((*field).to_string(), json!({ "type": kind, "description": help }));
    }
    let required: Vec<&str> = required.iter().map(|(field, _, _)| *field).collect();

    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        }),
    }
}

/// Every tool in the order it is listed.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        descriptor(
            CREATE_PAGE,
            "Create a new page in a database",
            &[DATABASE_ID, ("properties", "object", "Page properties keyed by property name")],
            &[],
        ),
        descriptor(GET_PAGE, "Retrieve a page by ID", &[PAGE_ID], &[]),
        descriptor(
            UPDATE_PAGE,
            "Update properties of an existing page",
            &[PAGE_ID, ("properties", "object", "Properties to set; others are kept")],
            &[],
        ),
        descriptor(DELETE_PAGE, "Delete (archive) a page", &[PAGE_ID], &[]),
        descriptor(
            QUERY_PAGES,
            "Query pages in a database",
            &[DATABASE_ID],
            &[
                ("filter", "object", "Filter object passed to the database query"),
                ("sorts", "array", "Sort criteria"),
                ("startCursor", "string", "Cursor from a previous query"),
                ("pageSize", "number", "Number of results per page (max 100)"),
            ],
        ),
        descriptor(GET_DATABASE, "Retrieve a database by ID", &[DATABASE_ID], &[]),
        descriptor(LIST_DATABASES, "List all databases shared with the integration", &[], &[]),
        descriptor(
            UPDATE_DATABASE,
            "Update a database title or schema",
            &[DATABASE_ID],
            &[
                ("title", "string", "New database title"),
                ("schema", "object", "Property schema to merge into the database"),
            ],
        ),
        descriptor(
            DUPLICATE_PAGE,
            "Copy a page into the same database",
            &[PAGE_ID],
            &[],
        ),
        descriptor(
            ARCHIVE_ALL_PAGES,
            "Archive every active page in a database",
            &[DATABASE_ID],
            &[],
        ),
        descriptor(
            GET_DATABASE_STATISTICS,
            "Count total, archived and active pages in a database",
            &[DATABASE_ID],
            &[],
        ),
    ]
}
