//! vq-agent - VitalQuest coaching agent service
//!
//! HTTP front for the coaching pipeline: fact extraction, memory recall,
//! prompt composition, and multi-mode dispatch against the generative
//! backend.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("vq_agent=info".parse()?)
                .add_directive("vq_core=info".parse()?),
        )
        .init();

    info!("vq-agent v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let state = AppState::new(config)?;
    let router = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    info!("listening on {}", state.config.bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
