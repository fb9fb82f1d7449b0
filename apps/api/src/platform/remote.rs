//! HTTP client for the hosting platform — one reqwest client behind every
//! platform trait, with retry on 429/5xx and exponential backoff.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::analyze::convert::{ConvertError, ConvertedPage, PdfConverter};
use crate::platform::{
    AiClient, BlobHandle, BlobStore, ChatOptions, ChatResponse, KvItem, KvStore, PlatformError,
    UploadFile,
};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct RemoteError {
    error: RemoteErrorBody,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        RemoteClient {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// Sends a request, retrying on 429 and 5xx with exponential backoff.
    /// Non-retryable failures surface the platform's error message when the
    /// body carries one.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, PlatformError>
    where
        F: Fn() -> reqwest::RequestBuilder + Send + Sync,
    {
        let mut last_error: Option<PlatformError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Platform call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.authed(build()).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(PlatformError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Platform API returned {}: {}", status, body);
                last_error = Some(PlatformError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<RemoteError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(PlatformError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(PlatformError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn multipart_form(files: &[UploadFile]) -> Result<reqwest::multipart::Form, PlatformError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.data.to_vec())
                .file_name(file.name.clone())
                .mime_str(&file.mime)?;
            form = form.part("file", part);
        }
        Ok(form)
    }
}

#[derive(Debug, Deserialize)]
struct ValueEnvelope {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedEnvelope {
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct PathEnvelope {
    path: Option<String>,
}

#[async_trait]
impl KvStore for RemoteClient {
    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let response = self
            .send_with_retry(|| self.http.get(self.url("/v1/kv")).query(&[("key", key)]))
            .await?;
        let envelope: ValueEnvelope = response.json().await?;
        Ok(envelope.value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.send_with_retry(|| {
            self.http
                .put(self.url("/v1/kv"))
                .json(&json!({"key": key, "value": value}))
        })
        .await?;
        Ok(())
    }

    async fn list(&self, pattern: &str, with_values: bool) -> Result<Vec<KvItem>, PlatformError> {
        let response = self
            .send_with_retry(|| {
                self.http.get(self.url("/v1/kv/list")).query(&[
                    ("pattern", pattern.to_string()),
                    ("with_values", with_values.to_string()),
                ])
            })
            .await?;
        let items: Vec<KvItem> = response.json().await?;
        debug!("Listed {} records for pattern {pattern}", items.len());
        Ok(items)
    }

    async fn delete(&self, key: &str) -> Result<bool, PlatformError> {
        let response = self
            .send_with_retry(|| self.http.delete(self.url("/v1/kv")).query(&[("key", key)]))
            .await?;
        let envelope: DeletedEnvelope = response.json().await?;
        Ok(envelope.deleted)
    }
}

#[async_trait]
impl BlobStore for RemoteClient {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<Option<BlobHandle>, PlatformError> {
        // Multipart bodies are not replayable, so uploads get one attempt.
        let form = Self::multipart_form(&files)?;
        let response = self
            .authed(self.http.post(self.url("/v1/blob")).multipart(form))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: PathEnvelope = response.json().await?;
        Ok(envelope.path.map(|path| BlobHandle { path }))
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>, PlatformError> {
        match self
            .send_with_retry(|| self.http.get(self.url("/v1/blob")).query(&[("path", path)]))
            .await
        {
            Ok(response) => Ok(Some(response.bytes().await?)),
            Err(PlatformError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AiClient for RemoteClient {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ChatResponse, PlatformError> {
        let response = self
            .send_with_retry(|| {
                self.http
                    .post(self.url("/v1/ai/chat"))
                    .json(&json!({"prompt": prompt, "options": options}))
            })
            .await?;
        Ok(response.json().await?)
    }

    async fn feedback(
        &self,
        document_path: &str,
        instructions: &str,
    ) -> Result<ChatResponse, PlatformError> {
        let response = self
            .send_with_retry(|| {
                self.http
                    .post(self.url("/v1/ai/feedback"))
                    .json(&json!({"path": document_path, "instructions": instructions}))
            })
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PdfConverter for RemoteClient {
    async fn first_page_png(&self, file_name: &str, data: &Bytes) -> Result<ConvertedPage, ConvertError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ConvertError::Backend(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authed(self.http.post(self.url("/v1/pdf/first-page")).multipart(form))
            .send()
            .await
            .map_err(|e| ConvertError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::Backend(format!("status {status}: {body}")));
        }

        let png = response
            .bytes()
            .await
            .map_err(|e| ConvertError::Backend(e.to_string()))?;
        Ok(ConvertedPage { png })
    }
}
