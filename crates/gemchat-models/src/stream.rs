//! Payload carried by each `data: ` line of a chat response stream.

use serde::{Deserialize, Serialize};

/// Prefix marking a payload line in the event stream.
pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StreamPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            text: None,
            error: Some(message.into()),
        }
    }

    /// Encode as one server-sent event: `data: {json}\n\n`.
    pub fn to_event(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("{}{}\n\n", DATA_PREFIX, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_event() {
        assert_eq!(
            StreamPayload::text("Hel").to_event(),
            "data: {\"text\":\"Hel\"}\n\n"
        );
        assert_eq!(
            StreamPayload::error("quota").to_event(),
            "data: {\"error\":\"quota\"}\n\n"
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload: StreamPayload =
            serde_json::from_str(r#"{"text": "hi", "index": 3}"#).unwrap();
        assert_eq!(payload.text.as_deref(), Some("hi"));
        assert!(payload.error.is_none());
    }
}
