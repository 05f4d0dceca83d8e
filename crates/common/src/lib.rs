// notion-mcp-common: wire-level protocol types shared by the server and its tests

pub mod protocol;
pub mod types;
