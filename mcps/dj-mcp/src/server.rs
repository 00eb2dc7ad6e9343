//! DJ MCP Server implementation

use crate::config::DjConfig;
use crate::row::Value;
use crate::store::{Store, StoreError};
use mcp_common::{
    async_trait, error_text, json_success, EmbeddableError, EmbeddableMcp, EmbeddableResult,
    IntoMcpError, McpError, ResultExt,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Implementation, ListResourcesResult, PaginatedRequestParam,
        RawResource, ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, RoleServer,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name the server reports to clients
pub const SERVER_NAME: &str = "dj";

/// Address of the schema resource
pub const SCHEMA_URI: &str = "schema://main";

/// Content type of the schema document, listed and read alike
const SCHEMA_MIME_TYPE: &str = "text/plain";

/// Catalog query behind the schema resource
const SCHEMA_SQL: &str = "SELECT sql FROM sqlite_master WHERE type='table'";

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for the query tool
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// SQL statement to execute. Any statement is accepted, including ones that modify data.
    pub sql: String,
}

// ============================================================================
// Server Implementation
// ============================================================================

/// DJ MCP Server
///
/// Stateless per call: every request opens its own connection to the
/// database file and closes it before answering.
#[derive(Clone)]
pub struct DjMcpServer {
    store: Store,
    tool_router: ToolRouter<Self>,
}

impl DjMcpServer {
    /// Create a server from the startup configuration
    pub fn new() -> Self {
        let config = DjConfig::resolve();
        tracing::info!("Using database at {:?}", config.database.path);
        Self::with_config(&config)
    }

    pub fn with_config(config: &DjConfig) -> Self {
        Self::with_store(Store::new(config.database.path.clone()))
    }

    pub fn with_store(store: Store) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Read every table definition, newline-joined in catalog order.
    ///
    /// Introspection failures are not recovered here; they become protocol errors.
    pub async fn read_schema(&self) -> Result<String, StoreError> {
        let mut conn = self.store.open().await?;
        let result = conn.all(SCHEMA_SQL).await;
        let closed = conn.close().await;

        let tables = result?;
        closed?;

        let definitions: Vec<&str> = tables
            .iter()
            .map(|row| match row.get("sql") {
                Some(Value::Text(sql)) => sql.as_str(),
                _ => "",
            })
            .collect();

        Ok(definitions.join("\n"))
    }

    /// The resources this server exposes
    pub fn resources() -> Vec<Resource> {
        let mut schema = RawResource::new(SCHEMA_URI, "schema");
        schema.description = Some("CREATE TABLE statements for every table in the database".to_string());
        schema.mime_type = Some(SCHEMA_MIME_TYPE.to_string());

        vec![schema.no_annotation()]
    }

    /// Resolve a resource address to its contents
    pub async fn read_resource_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        if uri != SCHEMA_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                None,
            ));
        }

        let text = self.read_schema().await.map_err(|e| {
            tracing::error!("Failed to read schema: {}", e);
            e.into_mcp_error()
        })?;

        let mut contents = ResourceContents::text(text, uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(SCHEMA_MIME_TYPE.to_string());
        }

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

impl Default for DjMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl DjMcpServer {
    /// Execute a SQL statement and return the resulting rows
    #[tool(description = "Execute a SQL statement against the database and return the resulting rows as a JSON array of objects keyed by column name. Statements are not restricted: INSERT, UPDATE, DELETE and DDL run as given and return an empty array. A failed statement returns an error result with the database message.")]
    async fn query(&self, Parameters(params): Parameters<QueryParams>) -> Result<CallToolResult, McpError> {
        let mut conn = self.store.open().await.to_mcp_err()?;
        let result = conn.all(&params.sql).await;
        let closed = conn.close().await;

        match result {
            Ok(rows) => {
                closed.to_mcp_err()?;
                json_success(&rows)
            }
            Err(e) => {
                closed.to_mcp_err()?;
                tracing::debug!("Query failed: {}", e);
                Ok(error_text(format!("Error: {}", e)))
            }
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for DjMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            server_info,
            instructions: Some(format!(
                "SQLite database MCP server. Read the {} resource for the CREATE TABLE \
                statements of every table, then use the query tool to run SQL. \
                The query tool does not restrict statements and can modify the database.",
                SCHEMA_URI
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(Self::resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_resource_uri(&request.uri).await
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for DjMcpServer {
    fn server_name(&self) -> &str {
        SERVER_NAME
    }

    fn server_description(&self) -> Option<&str> {
        Some("SQLite database MCP server - exposes the table schema as a resource and runs SQL through the query tool.")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: serde_json::Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "query" => {
                let params: QueryParams = serde_json::from_value(params)?;
                self.query(Parameters(params)).await.map_err(Into::into)
            }

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }

    fn list_resources(&self) -> Vec<Resource> {
        Self::resources()
    }

    async fn read_resource(&self, uri: &str) -> EmbeddableResult<ReadResourceResult> {
        if uri != SCHEMA_URI {
            return Err(EmbeddableError::ResourceNotFound(uri.to_string()));
        }
        self.read_resource_uri(uri).await.map_err(Into::into)
    }
}
