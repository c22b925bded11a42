mod handlers;
mod server;

use std::env;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursecal_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The extraction collaborator is not optional; refuse to start without
    // its credential rather than failing per-request later.
    if env::var("GEMINI_API_KEY").is_err() {
        return Err(anyhow::anyhow!(
            "GEMINI_API_KEY environment variable is required"
        ));
    }

    server::start_server().await
}
