pub mod jsonrpc;
pub mod mcp_methods;
