//! DJ MCP Library
//!
//! Exposes a SQLite database file to MCP clients:
//!
//! - `schema://main` resource: the `CREATE TABLE` statement of every table
//! - `query` tool: runs any SQL statement and returns the rows as JSON
//!
//! [`import::import_csv`] (and the `dj-import` binary) loads CSV data into a
//! table beforehand.
//!
//! The query tool is deliberately unrestricted. It runs DDL and DML as given,
//! so anyone who can reach the server can modify the database.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use dj_mcp::{DjConfig, DjMcpServer};
//! use mcp_common::EmbeddableMcp;
//!
//! let server = DjMcpServer::with_config(&DjConfig::with_database("songs.db"));
//! let result = server
//!     .call_tool("query", serde_json::json!({ "sql": "SELECT * FROM song LIMIT 5" }))
//!     .await?;
//! ```

pub mod config;
pub mod import;
pub mod row;
pub mod server;
pub mod store;

pub use config::DjConfig;
pub use row::{Row, Value};
pub use server::{DjMcpServer, QueryParams, SCHEMA_URI, SERVER_NAME};
pub use store::{Store, StoreConnection, StoreError, StoreStats};
