//! OpenAI-compatible chat completions client
//!
//! A thin wrapper over `POST {api_url}/chat/completions` that sends a
//! system + user message pair and returns the first choice's text.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from model")]
    EmptyResponse,
}

/// One completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl ChatRequest {
    fn wire(&self) -> WireRequest<'_> {
        WireRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: &self.system,
                },
                WireMessage {
                    role: "user",
                    content: &self.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_url: Arc<String>,
    api_key: Arc<String>,
}

impl ChatClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("Mimic/0.1.0")
            .build()?;

        Ok(Self {
            client,
            api_url: Arc::new(api_url.trim_end_matches('/').to_string()),
            api_key: Arc::new(api_key.to_string()),
        })
    }

    /// Run a completion and return the text of the first choice
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        debug!(
            "Chat completion request to {}/chat/completions (model {})",
            self.api_url, request.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request.wire())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Chat API error {}: {}", status, message);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response.json().await?;
        first_choice_text(&json).ok_or(ChatError::EmptyResponse)
    }
}

/// Pull `choices[0].message.content` out of a completion response
pub fn first_choice_text(json: &serde_json::Value) -> Option<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            system: "be terse".to_string(),
            user: "hello".to_string(),
            temperature: 0.1,
            max_tokens: Some(2000),
        };

        let body = serde_json::to_value(request.wire()).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_request_body_omits_max_tokens() {
        let request = ChatRequest {
            model: "m".to_string(),
            system: String::new(),
            user: String::new(),
            temperature: 0.7,
            max_tokens: None,
        };

        let body = serde_json::to_value(request.wire()).unwrap();
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_first_choice_text() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "hi there" } }]
        });
        assert_eq!(first_choice_text(&json), Some("hi there".to_string()));

        let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });
        assert_eq!(first_choice_text(&blank), None);

        assert_eq!(first_choice_text(&serde_json::json!({})), None);
    }
}
