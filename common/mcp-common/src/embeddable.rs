//! Embeddable MCP trait for in-process execution
//!
//! This module provides the [`EmbeddableMcp`] trait that allows MCP servers
//! to be driven directly in-process without a transport, e.g. from a host
//! application or from tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use dj_mcp::DjMcpServer;
//!
//! let server = DjMcpServer::new();
//!
//! let schema = server.read_resource("schema://main").await?;
//! let result = server
//!     .call_tool("query", serde_json::json!({ "sql": "SELECT 1" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, ReadResourceResult, Resource, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool was not found in the server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// No resource is served at the address
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// MCP protocol error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent calls
/// from multiple async tasks.
///
/// # Implementation
///
/// Servers that use `#[tool_router]` implement the tool half by delegating
/// to their internal router. Servers without resources keep the default
/// resource methods.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Returns the server name for identification
    fn server_name(&self) -> &str;

    /// Returns a list of all available tools
    ///
    /// Each tool includes its name, description, and input schema.
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name with the given parameters
    ///
    /// # Returns
    ///
    /// Returns the tool result on success, or an error if:
    /// - The tool is not found
    /// - The parameters do not deserialize
    /// - The tool raised a protocol-level error
    ///
    /// A tool that reports its own failure through an error-flagged result
    /// returns `Ok` here.
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Returns the resources the server exposes
    fn list_resources(&self) -> Vec<Resource> {
        Vec::new()
    }

    /// Reads the resource at `uri`
    async fn read_resource(&self, uri: &str) -> EmbeddableResult<ReadResourceResult> {
        Err(EmbeddableError::ResourceNotFound(uri.to_string()))
    }

    /// Returns an optional description of the server
    fn server_description(&self) -> Option<&str> {
        None
    }

    /// Returns the server version, if available
    fn server_version(&self) -> Option<&str> {
        None
    }
}
