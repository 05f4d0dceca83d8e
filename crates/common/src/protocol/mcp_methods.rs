// MCP method and tool name constants.

// ── Lifecycle ──────────────────────────────────────────────────────
pub const INITIALIZE: &str = "initialize";
pub const INITIALIZED_NOTIFICATION: &str = "notifications/initialized";
pub const PING: &str = "ping";

// ── Tools ──────────────────────────────────────────────────────────
pub const TOOLS_LIST: &str = "tools/list";
pub const TOOLS_CALL: &str = "tools/call";

/// JSON-RPC methods the server answers.
pub const IMPLEMENTED_METHODS: &[&str] = &[INITIALIZE, PING, TOOLS_LIST, TOOLS_CALL];

/// Notifications the server accepts silently.
pub const ACCEPTED_NOTIFICATIONS: &[&str] =
    &[INITIALIZED_NOTIFICATION, "notifications/cancelled"];

// ── Page tools ─────────────────────────────────────────────────────
pub const CREATE_PAGE: &str = "create_page";
pub const GET_PAGE: &str = "get_page";
pub const UPDATE_PAGE: &str = "update_page";
pub const DELETE_PAGE: &str = "delete_page";
pub const QUERY_PAGES: &str = "query_pages";
pub const DUPLICATE_PAGE: &str = "duplicate_page";

// ── Database tools ─────────────────────────────────────────────────
pub const GET_DATABASE: &str = "get_database";
pub const LIST_DATABASES: &str = "list_databases";
pub const UPDATE_DATABASE: &str = "update_database";
pub const ARCHIVE_ALL_PAGES: &str = "archive_all_pages";
pub const GET_DATABASE_STATISTICS: &str = "get_database_statistics";

/// Every tool advertised by `tools/list`, in listing order.
pub const TOOL_NAMES: &[&str] = &[
    CREATE_PAGE,
    GET_PAGE,
    UPDATE_PAGE,
    DELETE_PAGE,
    QUERY_PAGES,
    GET_DATABASE,
    LIST_DATABASES,
    UPDATE_DATABASE,
    DUPLICATE_PAGE,
    ARCHIVE_ALL_PAGES,
    GET_DATABASE_STATISTICS,
];
