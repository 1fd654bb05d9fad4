use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the variables may come from the environment.
    let dotenv = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::DEBUG))
        .with(telemetry::layer())
        .try_init()?;

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    if let Err(err) = api::start().await {
        error!(error = %err, "migration-chat-backend stopped");
        return Err(err.into());
    }

    Ok(())
}
