//! # eosbridge-mcp
//!
//! Model Context Protocol server exposing ETC Eos console operations as tools.
//! Requests arrive as JSON-RPC over stdio; each tool call is validated and
//! sent to the console through [`eosbridge_control::EosClient`].

pub mod error;
pub mod logging_setup;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{ToolError, ToolResult};
pub use protocol::*;
pub use server::McpServer;
pub use tools::{all_tools, ToolSpec};

// Re-export for convenience
pub use anyhow::Result;
