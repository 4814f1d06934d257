//! GemChat servers
//!
//! `gemchat-proxy` exposes `POST /api/chat` and relays each request to the
//! chat service. `gemchat-backend` is that service: it answers `POST /chat`
//! with a Gemini-generated event stream.

pub mod backend;
pub mod config;
pub mod proxy;
pub mod upstream_client;

pub use backend::backend_router;
pub use config::ServerConfig;
pub use proxy::proxy_router;
pub use upstream_client::UpstreamClient;

#[derive(serde::Serialize)]
pub struct Health {
    status: String,
}

pub async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "gemchat is working!".to_string(),
    })
}

/// Install the stdout subscriber shared by both binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gemchat_server=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();
}
