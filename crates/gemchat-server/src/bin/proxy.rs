use anyhow::Context;
use gemchat_server::{ServerConfig, UpstreamClient, init_tracing, proxy_router};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::load()?;
    tracing::info!(upstream = %config.proxy.upstream_url, "Starting GemChat proxy");

    let upstream = Arc::new(UpstreamClient::new(&config.proxy.upstream_url));
    let app = proxy_router(upstream);

    let addr = format!("{}:{}", config.proxy.host, config.proxy.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("GemChat proxy running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;
    Ok(())
}
