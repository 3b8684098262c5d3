use std::error::Error;

use embed_gateway::telemetry;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file, if there is one.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter("info"))
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("Ignoring unreadable .env file: {err}"),
    }

    api::start().await?;

    Ok(())
}
