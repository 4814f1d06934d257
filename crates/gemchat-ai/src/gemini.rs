//! Gemini streaming provider

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AiError, response_to_error};
use crate::http_client::build_http_client;
use crate::llm::{GenerationConfig, TextGenerator, TextStream};
use crate::sse::{SseLineDecoder, data_field};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<GenerationConfig> for GeminiGenerationConfig {
    fn from(config: GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiStreamResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .take(1)
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

enum LineOutcome {
    Text(String),
    Failed(AiError),
    Skip,
}

fn handle_line(line: &str) -> LineOutcome {
    let Some(data) = data_field(line) else {
        return LineOutcome::Skip;
    };

    match serde_json::from_str::<GeminiStreamResponse>(data) {
        Ok(parsed) => {
            if let Some(error) = parsed.error {
                return LineOutcome::Failed(AiError::Llm(error.message));
            }
            let text = parsed.text();
            if text.is_empty() {
                LineOutcome::Skip
            } else {
                LineOutcome::Text(text)
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse Gemini stream event");
            LineOutcome::Skip
        }
    }
}

impl TextGenerator for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn generate_stream(&self, prompt: String, config: GenerationConfig) -> TextStream {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let url = self.stream_url();

        Box::pin(async_stream::stream! {
            let body = GeminiRequest {
                contents: vec![GeminiContent {
                    role: "user".to_string(),
                    parts: vec![GeminiPart { text: prompt }],
                }],
                generation_config: config.into(),
            };

            let response = match client
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield Err(AiError::Llm(format!("Request failed: {}", e)));
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(response_to_error(response, "Gemini").await);
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseLineDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(AiError::Llm(format!("Stream error: {}", e)));
                        return;
                    }
                };

                for line in decoder.push(&chunk) {
                    match handle_line(&line) {
                        LineOutcome::Text(text) => yield Ok(text),
                        LineOutcome::Failed(err) => {
                            yield Err(err);
                            return;
                        }
                        LineOutcome::Skip => {}
                    }
                }
            }

            // The last event may arrive without its trailing newline.
            if let Some(line) = decoder.finish() {
                match handle_line(&line) {
                    LineOutcome::Text(text) => yield Ok(text),
                    LineOutcome::Failed(err) => yield Err(err),
                    LineOutcome::Skip => {}
                }
            }

            debug!("Gemini stream finished");
        })
    }
}
