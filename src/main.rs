use schedule_bot::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting schedule bot");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the chat page and API until a shutdown signal arrives
    startup::start_server(config).await
}
