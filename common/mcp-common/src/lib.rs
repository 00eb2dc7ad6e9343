//! MCP Common - Shared utilities for MCP servers
//!
//! This crate provides common functionality used across MCP servers:
//!
//! - **Initialization**: `serve_stdio!` macro for standardized server startup
//! - **Results**: Helper functions for creating `CallToolResult` responses
//! - **Errors**: Traits for converting errors to MCP-compatible format
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, json_success, error_text};
//!
//! // In main.rs
//! serve_stdio!(MyServer, "my_mcp", "My MCP Server running on stdio");
//!
//! // In tool implementations
//! match run() {
//!     Ok(rows) => json_success(&rows),
//!     Err(e) => Ok(error_text(format!("Error: {}", e))),
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, IntoMcpError, ResultExt};
pub use init::init_tracing;
pub use result::{error_text, json_success};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
