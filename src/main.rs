use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use pacs_core::{CoreConfig, DEFAULT_REST_ADDR, ENV_REST_ADDR};

/// Main entry point for the PACS helper
///
/// Resolves configuration once, validates the catalogs and serves the REST API (with Swagger UI
/// at `/swagger-ui`) until Ctrl+C.
///
/// # Environment Variables
/// - `PACS_HELPER_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PACS_HELPER_CATALOG_DIR`: directory of `<lang>.yaml` catalogs (default: builtin catalogs)
/// - `PACS_HELPER_CASE_LOG`: case log path (default: "logs/cases.log")
/// - `PACS_HELPER_MATCH_MODE`: `single-best` or `all-matches`
/// - `PACS_HELPER_DEFAULT_LANG`: `en`, `fr` or `ar`
/// - `PACS_HELPER_PACS_IP`: PACS host shown in network check commands
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, catalogs or the server fail
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pacs_run=info".parse()?)
                .add_directive("pacs_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!(
        "++ Match mode {}, default language {}",
        cfg.match_mode().as_str(),
        cfg.default_language()
    );

    let app = router(AppState::from_config(cfg)?);

    tracing::info!("++ Starting PACS helper REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- PACS helper stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
