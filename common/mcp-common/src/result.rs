//! Result helpers for MCP tool responses
//!
//! Provides convenient functions for creating `CallToolResult` responses,
//! reducing boilerplate in tool implementations.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

/// Create a successful JSON response from any serializable data
///
/// This replaces the common pattern:
/// ```rust,ignore
/// let json = serde_json::to_string_pretty(&data)
///     .map_err(|e| McpError::internal_error(e.to_string(), None))?;
/// Ok(CallToolResult::success(vec![Content::text(json)]))
/// ```
///
/// With simply:
/// ```rust,ignore
/// json_success(&rows)
/// ```
///
/// # Returns
///
/// * `Ok(CallToolResult)` with pretty-printed JSON content (2-space indent)
/// * `Err(McpError)` if serialization fails
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Create an error-flagged text response
///
/// For tool failures that are a normal outcome of the tool rather than a
/// protocol fault. The call itself succeeds; the result carries
/// `is_error = true` so the caller can tell it apart from an empty success.
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::error_text;
///
/// match run_statement(&sql) {
///     Ok(rows) => json_success(&rows),
///     Err(e) => Ok(error_text(format!("Error: {}", e))),
/// }
/// ```
pub fn error_text(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}
