// notion-mcp-server library entry point.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod rpc;
pub mod runtime;
