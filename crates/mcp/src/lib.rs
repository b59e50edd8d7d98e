//! # Bedrock MCP
//!
//! Model Context Protocol server that exposes Bedrock Server Manager
//! operations as tools. Each tool validates its arguments, makes one call
//! through [`bedrock_client::BedrockApi`] and renders the outcome as text.

pub mod config;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::Cli;
pub use server::McpServer;
pub use tools::{register_all, Tool, ToolRegistry};
