use anyhow::Context;
use gemchat_ai::GeminiClient;
use gemchat_server::config::gemini_api_key;
use gemchat_server::{ServerConfig, backend_router, init_tracing};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let api_key = gemini_api_key()?;
    let config = ServerConfig::load()?;
    tracing::info!(model = %config.gemini.model, "Starting GemChat backend");

    let generator = GeminiClient::new(api_key)
        .with_model(&config.gemini.model)
        .with_base_url(&config.gemini.base_url);
    let app = backend_router(Arc::new(generator), &config.backend.allowed_origin)?;

    let addr = format!("{}:{}", config.backend.host, config.backend.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("GemChat backend running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;
    Ok(())
}
