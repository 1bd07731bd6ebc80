use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use clone_rag::api;
use clone_rag::config::Config;
use clone_rag::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        provider = %config.llm.provider,
        chat_model = %config.llm.chat_model,
        "Starting clone-rag server"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!("Listening on http://{bind_addr}");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
