//! Error types for the AI module

use thiserror::Error;

/// AI module error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{provider} API error {status}: {message}")]
    LlmHttp {
        provider: String,
        status: u16,
        message: String,
    },
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;

/// Turn a non-success response into an error, keeping a bounded slice of the body.
pub async fn response_to_error(response: reqwest::Response, provider: &str) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    const MAX_ERROR_BODY: usize = 512;
    let message = if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|index| body.is_char_boundary(*index))
            .unwrap_or(0);
        format!("{}... [truncated]", &body[..cut])
    } else {
        body
    };

    AiError::LlmHttp {
        provider: provider.to_string(),
        status,
        message,
    }
}
