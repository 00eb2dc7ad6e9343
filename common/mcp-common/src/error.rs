//! Error handling utilities for MCP servers
//!
//! Provides traits and types for consistent error handling across MCP servers.

use rmcp::ErrorData as McpError;

/// Trait for converting errors into MCP-compatible errors
///
/// Implement this trait for a server's own error types to enable
/// `.to_mcp_err()?` in tool implementations.
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::IntoMcpError;
///
/// impl IntoMcpError for StoreError {
///     fn into_mcp_error(self) -> McpError {
///         mcp_common::internal_error(self.to_string())
///     }
/// }
/// ```
pub trait IntoMcpError {
    /// Convert this error into an MCP error
    fn into_mcp_error(self) -> McpError;
}

/// Extension trait for Result types to convert to MCP errors
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::ResultExt;
///
/// let mut conn = self.store.open().await.to_mcp_err()?;
/// ```
pub trait ResultExt<T> {
    /// Convert the error to an MCP error
    fn to_mcp_err(self) -> Result<T, McpError>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> Result<T, McpError> {
        self.map_err(|e| e.into_mcp_error())
    }
}

/// Create an internal error with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}
