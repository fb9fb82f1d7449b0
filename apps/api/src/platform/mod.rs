//! Platform client seams — key-value storage, blob storage, and the AI
//! collaborator live behind these traits.
//!
//! ARCHITECTURAL RULE: no other module talks to the hosting platform
//! directly. Handlers and flows receive `Arc<dyn …>` handles from
//! `AppState`; `remote` is the production backend, `memory` backs tests.

pub mod memory;
pub mod remote;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The model used for all free-text generation calls.
pub const CHAT_MODEL: &str = "claude-3-7-sonnet";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvItem {
    pub key: String,
    pub value: String,
}

/// Key-value storage. Keys are namespaced strings (`resume:<id>`); values
/// are opaque JSON documents.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), PlatformError>;
    /// Lists keys matching a glob-ish pattern (`resume:*`). With
    /// `with_values`, each item carries its value.
    async fn list(&self, pattern: &str, with_values: bool) -> Result<Vec<KvItem>, PlatformError>;
    async fn delete(&self, key: &str) -> Result<bool, PlatformError>;
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Bytes) -> Self {
        UploadFile {
            name: name.into(),
            mime: mime.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlobHandle {
    pub path: String,
}

/// Blob storage. `upload` returns `None` when the platform rejects the
/// upload without an error (the caller treats that as a failed step).
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Option<BlobHandle>, PlatformError>;
    async fn read(&self, path: &str) -> Result<Option<Bytes>, PlatformError>;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn with_model(model: &str) -> Self {
        ChatOptions {
            model: Some(model.to_string()),
            ..Default::default()
        }
    }
}

/// The platform returns message content either as a plain string or as a
/// block list; `text()` flattens both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub content: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// The first text content of the response, or `""` when there is none.
    pub fn text(&self) -> &str {
        match &self.message.content {
            MessageContent::Text(text) => text,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .find_map(|b| b.text.as_deref())
                .unwrap_or_default(),
        }
    }
}

/// AI collaborator: free-text generation plus the document critique call.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ChatResponse, PlatformError>;
    /// Critique of an already-uploaded document; `document_path` is a blob
    /// path previously returned by [`BlobStore::upload`].
    async fn feedback(
        &self,
        document_path: &str,
        instructions: &str,
    ) -> Result<ChatResponse, PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_text_from_string_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"message": {"content": "plain text"}}"#).unwrap();
        assert_eq!(response.text(), "plain text");
    }

    #[test]
    fn test_chat_response_text_from_block_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"message": {"content": [{"type": "text", "text": "block text"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "block text");
    }

    #[test]
    fn test_chat_response_text_empty_blocks() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"message": {"content": []}}"#).unwrap();
        assert_eq!(response.text(), "");
    }
}
