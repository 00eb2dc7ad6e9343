//! Server initialization utilities
//!
//! Provides standardized tracing setup and the `serve_stdio!` macro
//! for consistent MCP server startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Sets up logging to stderr (stdout is reserved for MCP protocol) with:
/// - Formatted output without ANSI colors (for clean logs)
/// - Environment-based filtering via RUST_LOG
/// - Default log level of `info` for the specified crate
///
/// Set `LOG_FORMAT=json` for structured JSON output.
/// Default is human-readable text output.
///
/// # Arguments
///
/// * `crate_name` - The name of the MCP server crate (e.g., "dj_mcp")
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

/// Macro for standardized MCP server initialization
///
/// Expands to a complete `#[tokio::main] async fn main()` that:
/// 1. Initializes tracing to stderr
/// 2. Creates the server with `::new()`
/// 3. Serves via stdio transport, logging `$ready` once connected
/// 4. Waits for shutdown
///
/// Log lines are emitted from the expansion so they carry the server
/// crate's target, which `init_tracing` enables at `info`.
///
/// Any startup failure is logged as `Fatal error in main(): ...` and the
/// process exits with status 1.
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::serve_stdio!(DjMcpServer, "dj_mcp", "DJ MCP Server running on stdio");
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr, $ready:expr) => {
        #[tokio::main]
        async fn main() {
            if let Err(e) = $crate::init_tracing($crate_name) {
                eprintln!("Fatal error in main(): {:#}", e);
                std::process::exit(1);
            }

            tracing::info!(concat!("Starting ", $crate_name, " MCP Server"));

            if let Err(e) = serve().await {
                tracing::error!("Fatal error in main(): {:#}", e);
                std::process::exit(1);
            }
        }

        async fn serve() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            let server = <$server_type>::new();
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("{}", $ready);

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
