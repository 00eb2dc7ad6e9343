//! DJ MCP Server
//!
//! Serves the `schema://main` resource and the `query` tool over stdio
//! for the SQLite database configured at startup.

use dj_mcp::DjMcpServer;

mcp_common::serve_stdio!(DjMcpServer, "dj_mcp", "DJ MCP Server running on stdio");
