use std::sync::Arc;

use notion_mcp_common::protocol::jsonrpc::{
    negotiate_protocol_version, Request, RequestId, Response, RpcError, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use notion_mcp_common::protocol::mcp_methods::{
    ACCEPTED_NOTIFICATIONS, ARCHIVE_ALL_PAGES, CREATE_PAGE, DELETE_PAGE, DUPLICATE_PAGE,
    GET_DATABASE, GET_DATABASE_STATISTICS, GET_PAGE, INITIALIZE, LIST_DATABASES, PING,
    QUERY_PAGES, TOOLS_CALL, TOOLS_LIST, UPDATE_DATABASE, UPDATE_PAGE,
};
use notion_mcp_common::types::{
    CallToolParams, CallToolResult, InitializeResult, ListToolsResult, ServerInfo,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::trace::current_trace_id;
use super::{render, tools};
use crate::application::{
    ArchiveAllPages, CreatePage, DeletePage, DuplicatePage, GetDatabase, GetDatabaseStatistics,
    GetPage, ListDatabases, QueryPages, UpdateDatabase, UpdatePage,
};
use crate::domain::repository::{DatabaseRepository, PageRepository};
use crate::domain::service::NotionService;
use crate::domain::DomainError;

pub const SERVER_NAME: &str = "notion-mcp";

// ── Tool errors ─────────────────────────────────────────────────────

/// Failure of a single tool call. Reported in-band as an error-flagged
/// tool result, never as a JSON-RPC error.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("failed to encode tool result: {0}")]
    Encode(#[from] serde_json::Error),
}

fn decode_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: Option<Value>,
) -> Result<T, ToolError> {
    let arguments = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(arguments) => arguments,
    };
    serde_json::from_value(arguments).map_err(|error| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: error.to_string(),
    })
}

// ── Tool handlers ───────────────────────────────────────────────────

/// Every use case, wired once at start-up.
pub struct ToolHandlers<P, D> {
    create_page: CreatePage<P>,
    get_page: GetPage<P>,
    update_page: UpdatePage<P>,
    delete_page: DeletePage<P>,
    query_pages: QueryPages<P>,
    get_database: GetDatabase<D>,
    list_databases: ListDatabases<D>,
    update_database: UpdateDatabase<D>,
    duplicate_page: DuplicatePage<P, D>,
    archive_all_pages: ArchiveAllPages<P, D>,
    get_database_statistics: GetDatabaseStatistics<P, D>,
}

impl<P: PageRepository, D: DatabaseRepository> ToolHandlers<P, D> {
    pub fn new(pages: Arc<P>, databases: Arc<D>) -> Self {
        let service = NotionService::new(Arc::clone(&pages), Arc::clone(&databases));
        Self {
            create_page: CreatePage::new(Arc::clone(&pages)),
            get_page: GetPage::new(Arc::clone(&pages)),
            update_page: UpdatePage::new(Arc::clone(&pages)),
            delete_page: DeletePage::new(Arc::clone(&pages)),
            query_pages: QueryPages::new(pages),
            get_database: GetDatabase::new(Arc::clone(&databases)),
            list_databases: ListDatabases::new(Arc::clone(&databases)),
            update_database: UpdateDatabase::new(databases),
            duplicate_page: DuplicatePage::new(service.clone()),
            archive_all_pages: ArchiveAllPages::new(service.clone()),
            get_database_statistics: GetDatabaseStatistics::new(service),
        }
    }

    /// Runs one tool by name and returns its success text.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<String, ToolError> {
        let text = match name {
            CREATE_PAGE => {
                let page = self.create_page.execute(decode_arguments(name, arguments)?).await?;
                render::created_page(&page)?
            }
            GET_PAGE => {
                let page = self.get_page.execute(decode_arguments(name, arguments)?).await?;
                render::page(page.as_ref())?
            }
            UPDATE_PAGE => {
                let page = self.update_page.execute(decode_arguments(name, arguments)?).await?;
                render::updated_page(&page)?
            }
            DELETE_PAGE => {
                self.delete_page.execute(decode_arguments(name, arguments)?).await?;
                render::PAGE_DELETED.to_string()
            }
            QUERY_PAGES => {
                let result = self.query_pages.execute(decode_arguments(name, arguments)?).await?;
                render::query_result(&result)?
            }
            GET_DATABASE => {
                let database = self.get_database.execute(decode_arguments(name, arguments)?).await?;
                render::database(database.as_ref())?
            }
            LIST_DATABASES => {
                let databases = self.list_databases.execute().await?;
                render::database_list(&databases)?
            }
            UPDATE_DATABASE => {
                let database =
                    self.update_database.execute(decode_arguments(name, arguments)?).await?;
                render::updated_database(&database)?
            }
            DUPLICATE_PAGE => {
                let page = self.duplicate_page.execute(decode_arguments(name, arguments)?).await?;
                render::created_page(&page)?
            }
            ARCHIVE_ALL_PAGES => {
                let archived =
                    self.archive_all_pages.execute(decode_arguments(name, arguments)?).await?;
                render::archived_pages(&archived)?
            }
            GET_DATABASE_STATISTICS => {
                let statistics =
                    self.get_database_statistics.execute(decode_arguments(name, arguments)?).await?;
                render::statistics(&statistics)?
            }
            _ => return Err(ToolError::UnknownOperation(name.to_string())),
        };
        Ok(text)
    }
}

// ── Server state ────────────────────────────────────────────────────

pub struct McpServerState<P, D> {
    handlers: Arc<ToolHandlers<P, D>>,
    server_info: ServerInfo,
}

impl<P, D> Clone for McpServerState<P, D> {
    fn clone(&self) -> Self {
        Self { handlers: Arc::clone(&self.handlers), server_info: self.server_info.clone() }
    }
}

impl<P: PageRepository, D: DatabaseRepository> McpServerState<P, D> {
    pub fn new(handlers: ToolHandlers<P, D>) -> Self {
        Self {
            handlers: Arc::new(handlers),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn from_repositories(pages: Arc<P>, databases: Arc<D>) -> Self {
        Self::new(ToolHandlers::new(pages, databases))
    }

    async fn call_tool(&self, params: CallToolParams) -> CallToolResult {
        let trace_id = current_trace_id().unwrap_or_default();
        match self.handlers.call(&params.name, params.arguments).await {
            Ok(text) => {
                info!(tool = %params.name, %trace_id, "tool call succeeded");
                CallToolResult::text(text)
            }
            Err(error) => {
                warn!(tool = %params.name, %trace_id, %error, "tool call failed");
                CallToolResult::error(error)
            }
        }
    }
}

// ── JSON-RPC dispatch ───────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    protocol_version: Option<String>,
}

/// Decodes one line and dispatches it. `None` means nothing is written
/// back, which is the case for every notification.
pub async fn handle_raw_request<P, D>(raw: &[u8], state: &McpServerState<P, D>) -> Option<Response>
where
    P: PageRepository,
    D: DatabaseRepository,
{
    let request = match serde_json::from_slice::<Request>(raw) {
        Ok(request) => request,
        Err(error) => {
            return Some(Response::error(
                RequestId::Null,
                RpcError {
                    code: PARSE_ERROR,
                    message: "Parse error".to_string(),
                    data: Some(json!({ "reason": error.to_string() })),
                },
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        let id = request.id?;
        return Some(Response::error(
            id,
            RpcError { code: INVALID_REQUEST, message: "Invalid Request".to_string(), data: None },
        ));
    }

    dispatch_request(request, state).await
}

pub async fn dispatch_request<P, D>(request: Request, state: &McpServerState<P, D>) -> Option<Response>
where
    P: PageRepository,
    D: DatabaseRepository,
{
    let Some(id) = request.id else {
        if ACCEPTED_NOTIFICATIONS.contains(&request.method.as_str()) {
            debug!(method = %request.method, "notification received");
        } else {
            debug!(method = %request.method, "ignoring unknown notification");
        }
        return None;
    };

    let response = match request.method.as_str() {
        INITIALIZE => handle_initialize(id, request.params, state),
        PING => Response::success(id, json!({})),
        TOOLS_LIST => handle_tools_list(id),
        TOOLS_CALL => handle_tools_call(id, request.params, state).await,
        _ => Response::error(
            id,
            RpcError {
                code: METHOD_NOT_FOUND,
                message: "Method not found".to_string(),
                data: None,
            },
        ),
    };
    Some(response)
}

fn handle_initialize<P, D>(
    id: RequestId,
    params: Option<Value>,
    state: &McpServerState<P, D>,
) -> Response {
    let params = params
        .and_then(|params| serde_json::from_value::<InitializeParams>(params).ok())
        .unwrap_or_default();
    let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
    info!(protocol_version, "client initialized session");

    let result = InitializeResult {
        protocol_version: protocol_version.to_string(),
        capabilities: json!({ "tools": {} }),
        server_info: state.server_info.clone(),
    };
    encode_result(id, &result)
}

fn handle_tools_list(id: RequestId) -> Response {
    encode_result(id, &ListToolsResult { tools: tools::tool_descriptors() })
}

async fn handle_tools_call<P, D>(
    id: RequestId,
    params: Option<Value>,
    state: &McpServerState<P, D>,
) -> Response
where
    P: PageRepository,
    D: DatabaseRepository,
{
    let Some(params) = params else {
        return invalid_params_response(id, "tools/call requires params".to_string());
    };
    let params = match serde_json::from_value::<CallToolParams>(params) {
        Ok(params) => params,
        Err(error) => {
            return invalid_params_response(
                id,
                format!("failed to decode tools/call params: {error}"),
            );
        }
    };

    let result = state.call_tool(params).await;
    encode_result(id, &result)
}

fn encode_result<T: serde::Serialize>(id: RequestId, result: &T) -> Response {
    match serde_json::to_value(result) {
        Ok(value) => Response::success(id, value),
        Err(error) => Response::error(
            id,
            RpcError {
                code: INTERNAL_ERROR,
                message: "Internal error".to_string(),
                data: Some(json!({ "reason": error.to_string() })),
            },
        ),
    }
}

fn invalid_params_response(request_id: RequestId, reason: String) -> Response {
    Response::error(
        request_id,
        RpcError {
            code: INVALID_PARAMS,
            message: "Invalid params".to_string(),
            data: Some(json!({ "reason": reason })),
        },
    )
}
