//! `POST /chat`: flattens the conversation into one prompt and streams the
//! model's answer back as `data: ` events.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::StreamExt;
use gemchat_ai::{GenerationConfig, TextGenerator, build_prompt};
use gemchat_models::{ChatRequest, StreamPayload};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

pub type SharedGenerator = Arc<dyn TextGenerator>;

pub fn backend_router(generator: SharedGenerator, allowed_origin: &str) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|err| anyhow::anyhow!("Invalid allowed origin {}: {}", allowed_origin, err))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(crate::health))
        .route("/chat", post(chat_handler))
        .layer(cors)
        .with_state(generator))
}

async fn chat_handler(
    State(generator): State<SharedGenerator>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let prompt = build_prompt(&request);
    let config = GenerationConfig::from(request.settings);
    debug!(
        provider = generator.provider(),
        model = generator.model(),
        messages = request.messages.len(),
        "Starting generation"
    );

    let mut fragments = generator.generate_stream(prompt, config);
    let events = async_stream::stream! {
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(text) if text.is_empty() => {}
                Ok(text) => yield Ok::<_, Infallible>(StreamPayload::text(text).to_event()),
                Err(err) => {
                    warn!(error = %err, "Generation failed");
                    yield Ok(StreamPayload::error(err.to_string()).to_event());
                    break;
                }
            }
        }
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(events))
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use gemchat_ai::{MockGenerator, MockStep};
    use tower::ServiceExt;

    fn chat_request() -> Request<Body> {
        let body = serde_json::json!({
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ],
            "prompt": "Hi",
            "settings": {"temperature": 0.3, "maxOutputTokens": 512}
        });
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_streams_fragments_as_events() {
        let generator = MockGenerator::from_texts(["Hel", "", "lo"]);
        let app = backend_router(Arc::new(generator.clone()), "http://localhost:3000").unwrap();

        let response = app.oneshot(chat_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(
            body_text(response).await,
            "data: {\"text\":\"Hel\"}\n\ndata: {\"text\":\"lo\"}\n\n"
        );

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "system: Be brief.\nUser: Hi");
        assert_eq!(calls[0].1.temperature, 0.3);
        assert_eq!(calls[0].1.max_output_tokens, 512);
        assert_eq!(calls[0].1.top_k, 40);
    }

    #[tokio::test]
    async fn test_generation_failure_emits_error_event() {
        let generator = MockGenerator::new(vec![MockStep::text("par"), MockStep::error("quota")]);
        let app = backend_router(Arc::new(generator), "http://localhost:3000").unwrap();

        let response = app.oneshot(chat_request()).await.unwrap();
        assert_eq!(
            body_text(response).await,
            "data: {\"text\":\"par\"}\n\ndata: {\"error\":\"LLM error: quota\"}\n\n"
        );
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = backend_router(
            Arc::new(MockGenerator::default()),
            "http://localhost:3000",
        )
        .unwrap();

        let mut request = chat_request();
        request
            .headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(backend_router(Arc::new(MockGenerator::default()), "bad\norigin").is_err());
    }
}
