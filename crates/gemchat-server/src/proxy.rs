use crate::upstream_client::UpstreamClient;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{debug, error};

pub fn proxy_router(upstream: Arc<UpstreamClient>) -> Router {
    Router::new()
        .route("/health", get(crate::health))
        .route("/api/chat", post(chat_handler))
        .with_state(upstream)
}

async fn chat_handler(
    State(upstream): State<Arc<UpstreamClient>>,
    body: Bytes,
) -> Response {
    // Parsed from raw bytes: clients may omit the JSON content type.
    let body: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(err) => {
            debug!(error = %err, "Rejecting chat request with invalid JSON body");
            return (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", err))
                .into_response();
        }
    };

    debug!(upstream = %upstream.url(), "Forwarding chat request");

    match upstream.forward(&body).await {
        Ok(response) => relay(response),
        Err(err) => {
            error!(error = %err, upstream = %upstream.url(), "Failed to reach upstream");
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to reach upstream: {}", err),
            )
                .into_response()
        }
    }
}

/// Stream the upstream body back chunk by chunk as an event stream.
fn relay(response: reqwest::Response) -> Response {
    let status = response.status();
    if !status.is_success() {
        debug!(status = %status, "Upstream returned non-success status");
    }

    Response::builder()
        .status(status.as_u16())
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(response.bytes_stream()))
        .unwrap_or_else(|_| (StatusCode::BAD_GATEWAY, "Failed to build response").into_response())
}
