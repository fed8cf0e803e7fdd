//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the PACS helper REST API on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `pacs-run` binary serves the same
//! router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use pacs_core::{CoreConfig, DEFAULT_REST_ADDR, ENV_REST_ADDR};

/// Main entry point for the PACS helper REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000) with
/// OpenAPI/Swagger documentation at `/swagger-ui`.
///
/// # Environment Variables
/// - `PACS_HELPER_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `PACS_HELPER_*`: core configuration, see `CoreConfig::from_lookup`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or catalogs are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("pacs_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting PACS helper REST API on {}", addr);

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let app = router(AppState::from_config(cfg)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
