// MCP protocol adapter: JSON-RPC dispatch, tool rendering and the stdio transport.

pub mod methods;
pub mod render;
pub mod stdio;
pub mod tools;
pub mod trace;

pub use methods::{McpServerState, ToolError, ToolHandlers};
