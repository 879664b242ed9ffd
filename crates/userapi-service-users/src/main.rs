//! Binary entry point for the user management service.
//!
//! # Configuration
//!
//! - `SERVICE_PORT` / `--port` - HTTP port (default: 4000)
//! - `APP_ENV` / `--env` - `development` (default), `staging` or `production`
//! - `RUST_LOG` - Log filter (default: info)
//! - `LOG_FORMAT` - `json` (default) or `text`

use tracing::info;

use userapi_service_shared::{init_logging, AppState, ConfigError, LoggingConfig, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    init_logging(&LoggingConfig::from_env().with_service("users"))?;

    let state = AppState::in_memory(config.environment);
    info!(
        environment = %config.environment,
        version = state.version(),
        "starting users service"
    );

    let app = userapi_service_users::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
