//! HTTP client for the chat proxy and the loop that reads its event stream.

use futures::{Stream, StreamExt};
use gemchat_ai::{SseLineDecoder, parse_payload};
use gemchat_models::ChatRequest;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Progress of one in-flight reply, as seen by the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text fragment to append to the reply.
    TextDelta(String),
    /// The upstream reported a generation error inside the stream.
    UpstreamError(String),
    /// The stream ended normally.
    Finished,
    /// The request or the stream failed.
    Failed(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Proxy returned {status}: {body}")]
    Status { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    proxy_url: String,
}

impl ChatClient {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// POST the request and return the response once its status is known.
    pub async fn open(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(&self.proxy_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Run one request to completion, reporting progress on `events`.
    ///
    /// Always ends with exactly one `Finished` or `Failed`.
    pub async fn stream_chat(
        &self,
        request: ChatRequest,
        events: mpsc::UnboundedSender<StreamEvent>,
    ) {
        let outcome = match self.open(&request).await {
            Ok(response) => ingest_stream(response.bytes_stream(), &events)
                .await
                .map_err(ClientError::from),
            Err(err) => Err(err),
        };

        let last = match outcome {
            Ok(reply) => {
                debug!(chars = reply.chars().count(), "Reply finished");
                StreamEvent::Finished
            }
            Err(err) => {
                warn!(error = %err, url = %self.proxy_url, "Chat request failed");
                StreamEvent::Failed(err.to_string())
            }
        };
        let _ = events.send(last);
    }
}

/// Read an event stream to its end and return the accumulated reply.
///
/// Each `text` fragment is sent as a [`StreamEvent::TextDelta`]. Lines that
/// are not valid JSON are skipped; `error` payloads are reported and reading
/// continues.
pub async fn ingest_stream<S, B, E>(
    stream: S,
    events: &mpsc::UnboundedSender<StreamEvent>,
) -> std::result::Result<String, E>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = SseLineDecoder::new();
    let mut reply = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for line in decoder.push(chunk.as_ref()) {
            handle_line(&line, &mut reply, events);
        }
    }

    if let Some(line) = decoder.finish() {
        handle_line(&line, &mut reply, events);
    }

    Ok(reply)
}

fn handle_line(line: &str, reply: &mut String, events: &mpsc::UnboundedSender<StreamEvent>) {
    match parse_payload(line) {
        None => {}
        Some(Err(err)) => {
            warn!(error = %err, line, "Skipping malformed stream line");
        }
        Some(Ok(payload)) => {
            if let Some(message) = payload.error {
                warn!(error = %message, "Upstream reported an error");
                let _ = events.send(StreamEvent::UpstreamError(message));
            }
            if let Some(text) = payload.text.filter(|text| !text.is_empty()) {
                reply.push_str(&text);
                let _ = events.send(StreamEvent::TextDelta(text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_models::{ChatSettings, PromptMessage};
    use std::convert::Infallible;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chunks(
        parts: &[&'static str],
    ) -> impl Stream<Item = std::result::Result<&'static [u8], Infallible>> {
        let items: Vec<_> = parts.iter().copied().map(|part| Ok(part.as_bytes())).collect();
        futures::stream::iter(items)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_fragments_accumulate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reply = ingest_stream(
            chunks(&["data: {\"text\":\"Hel\"}\n", "data: {\"text\":\"lo\"}\n"]),
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(reply, "Hello");
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::TextDelta("Hel".to_string()),
                StreamEvent::TextDelta("lo".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_line_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reply = ingest_stream(
            chunks(&["data: {\"text\":\"a\"}\ndata: not json\n: comment\ndata: {\"text\":\"b\"}\n"]),
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(reply, "ab");
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_emits_no_delta() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reply = ingest_stream(
            chunks(&["data: {\"text\":\"\"}\ndata: {\"text\":\"a\"}\n"]),
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(reply, "a");
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::TextDelta(text) if text == "a"));
    }

    #[tokio::test]
    async fn test_line_split_across_chunks_parsed_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reply = ingest_stream(
            chunks(&["data: {\"te", "xt\":\"Hello\"}\n\n", "data: {\"text\":\"!\"}"]),
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(reply, "Hello!");
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::TextDelta("Hello".to_string()),
                StreamEvent::TextDelta("!".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_error_payload_reported_and_reading_continues() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reply = ingest_stream(
            chunks(&["data: {\"error\":\"quota\"}\n", "data: {\"text\":\"late\"}\n"]),
            &tx,
        )
        .await
        .unwrap();

        assert_eq!(reply, "late");
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::UpstreamError("quota".to_string()),
                StreamEvent::TextDelta("late".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stream = futures::stream::iter(vec![
            Ok(b"data: {\"text\":\"a\"}\n".as_slice()),
            Err("connection reset"),
        ]);

        let err = ingest_stream(stream, &tx).await.unwrap_err();
        assert_eq!(err, "connection reset");
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![PromptMessage::system("Be brief.")],
            prompt: "Hi".to_string(),
            settings: ChatSettings::default().generation(),
        }
    }

    #[tokio::test]
    async fn test_stream_chat_against_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "Hi",
                "settings": {"maxOutputTokens": 4096}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"text\":\"Hel\"}\n\ndata: {\"text\":\"lo\"}\n\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = ChatClient::new(format!("{}/api/chat", server.uri()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.stream_chat(request(), tx).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::TextDelta("Hel".to_string()),
                StreamEvent::TextDelta("lo".to_string()),
                StreamEvent::Finished
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_chat_reports_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Failed to reach upstream"))
            .mount(&server)
            .await;

        let client = ChatClient::new(format!("{}/api/chat", server.uri()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.stream_chat(request(), tx).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::Failed(msg) if msg.contains("502")));
    }
}
