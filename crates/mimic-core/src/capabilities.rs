//! External capabilities
//!
//! The coordinators only see these traits. The chat-backed implementations
//! send one system + user prompt pair to an OpenAI-compatible endpoint.

use async_trait::async_trait;
use mimic_tools::{ChatClient, ChatError, ChatRequest};
use tracing::debug;

use crate::error::MimicError;

/// Extracts writing patterns from a text corpus
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Returns the raw response, expected to hold one JSON object
    async fn analyze(&self, instruction: &str, corpus: &str) -> Result<String, MimicError>;
}

/// Produces new content items from a style brief
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the raw response, expected to hold one item per line
    async fn generate(&self, style_brief: &str, count: usize) -> Result<String, MimicError>;
}

pub struct ChatAnalyzer {
    client: ChatClient,
    model: String,
}

impl ChatAnalyzer {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextAnalyzer for ChatAnalyzer {
    async fn analyze(&self, instruction: &str, corpus: &str) -> Result<String, MimicError> {
        let request = ChatRequest {
            model: self.model.clone(),
            system: instruction.to_string(),
            user: format!(
                "Analyze these posts and return ONLY the JSON object in the specified format:\n\n{}",
                corpus
            ),
            temperature: 0.1,
            max_tokens: Some(2000),
        };

        debug!("Requesting style analysis ({} chars)", corpus.len());
        self.client
            .complete(&request)
            .await
            .map_err(|e| MimicError::Analysis(e.to_string()))
    }
}

pub struct ChatGenerator {
    client: ChatClient,
    model: String,
}

impl ChatGenerator {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ContentGenerator for ChatGenerator {
    async fn generate(&self, style_brief: &str, count: usize) -> Result<String, MimicError> {
        let request = ChatRequest {
            model: self.model.clone(),
            system: style_brief.to_string(),
            user: format!(
                "Generate {} unique posts that match this style and cover their usual topics. \
                 Return only the posts, one per line.",
                count
            ),
            temperature: 0.7,
            max_tokens: None,
        };

        self.client.complete(&request).await.map_err(|e| match e {
            ChatError::EmptyResponse => MimicError::Generation("empty output".to_string()),
            other => MimicError::Generation(other.to_string()),
        })
    }
}
