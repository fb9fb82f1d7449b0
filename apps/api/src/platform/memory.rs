#![allow(dead_code)]

//! In-process platform backends. Deterministic, no network. These carry
//! the flow tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::analyze::convert::{ConvertError, ConvertedPage, PdfConverter};
use crate::platform::{
    AiClient, BlobHandle, BlobStore, ChatMessage, ChatOptions, ChatResponse, KvItem, KvStore,
    MessageContent, PlatformError, UploadFile,
};

#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().expect("kv lock").clone()
    }
}

fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.entries.lock().expect("kv lock").get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.entries
            .lock()
            .expect("kv lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list(&self, pattern: &str, with_values: bool) -> Result<Vec<KvItem>, PlatformError> {
        Ok(self
            .entries
            .lock()
            .expect("kv lock")
            .iter()
            .filter(|(key, _)| matches_pattern(pattern, key))
            .map(|(key, value)| KvItem {
                key: key.clone(),
                value: if with_values { value.clone() } else { String::new() },
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, PlatformError> {
        Ok(self.entries.lock().expect("kv lock").remove(key).is_some())
    }
}

#[derive(Default)]
pub struct MemoryBlobs {
    files: Mutex<BTreeMap<String, Bytes>>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.lock().expect("blob lock").keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Option<BlobHandle>, PlatformError> {
        let mut guard = self.files.lock().expect("blob lock");
        let mut last_path = None;
        for file in files {
            let path = format!("/blobs/{}-{}", Uuid::new_v4(), file.name);
            guard.insert(path.clone(), file.data);
            last_path = Some(path);
        }
        Ok(last_path.map(|path| BlobHandle { path }))
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>, PlatformError> {
        Ok(self.files.lock().expect("blob lock").get(path).cloned())
    }
}

/// Scripted AI: pops one canned response per call, in order. An exhausted
/// script returns an API error, which flows surface like any collaborator
/// failure.
#[derive(Default)]
pub struct CannedAi {
    responses: Mutex<Vec<String>>,
}

impl CannedAi {
    pub fn new(responses: Vec<&str>) -> Self {
        CannedAi {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }

    fn next(&self) -> Result<ChatResponse, PlatformError> {
        let mut guard = self.responses.lock().expect("ai lock");
        if guard.is_empty() {
            return Err(PlatformError::Api {
                status: 500,
                message: "no scripted response".to_string(),
            });
        }
        let text = guard.remove(0);
        Ok(ChatResponse {
            message: ChatMessage {
                content: MessageContent::Text(text),
            },
        })
    }
}

#[async_trait]
impl AiClient for CannedAi {
    async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<ChatResponse, PlatformError> {
        self.next()
    }

    async fn feedback(
        &self,
        _document_path: &str,
        _instructions: &str,
    ) -> Result<ChatResponse, PlatformError> {
        self.next()
    }
}

/// Converter stub: hands back a fixed PNG payload without reading the PDF.
pub struct FixedConverter {
    pub png: Bytes,
}

impl FixedConverter {
    pub fn new(png: impl Into<Bytes>) -> Self {
        FixedConverter { png: png.into() }
    }
}

#[async_trait]
impl PdfConverter for FixedConverter {
    async fn first_page_png(&self, _file_name: &str, _data: &Bytes) -> Result<ConvertedPage, ConvertError> {
        Ok(ConvertedPage {
            png: self.png.clone(),
        })
    }
}
