use crate::chat::ChatService;
use crate::config::Config;
use crate::error::{other_error, Error};
use crate::shutdown;
use crate::web::{build_router, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the chat service and serve the web routes
pub async fn start_server(config: Config) -> miette::Result<()> {
    info!(
        "Answering for {} in time zone {}",
        config.profile.owner_name, config.timezone
    );

    let chat = ChatService::from_config(&config)?;
    let router = build_router(AppState {
        chat: Arc::new(chat),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| other_error(&format!("Failed to bind {}: {}", addr, e)))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(|e| other_error(&format!("Server error: {}", e)))?;

    info!("Server shut down");
    Ok(())
}
