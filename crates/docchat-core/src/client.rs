use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A file picked for upload: its name and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { name, bytes })
    }
}

/// The two calls the chat session makes against the document server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit a document. Any ok status counts as success; the body is ignored.
    async fn upload(&self, file: &SelectedFile) -> Result<(), ClientError>;

    /// Ask a question about the uploaded document and return the answer text.
    async fn chat(&self, query: &str) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// `ChatBackend` over HTTP: `POST /upload` (multipart) and `POST /chat` (JSON).
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<(), ClientError> {
        let url = format!("{}/upload", self.base_url);

        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Application {
                status: status.as_u16(),
                message: format!("upload failed with status: {}", status),
            });
        }

        Ok(())
    }

    async fn chat(&self, query: &str) -> Result<String, ClientError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&ChatRequest { query })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: ChatResponse =
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
            Ok(parsed.answer)
        } else {
            let parsed: ErrorResponse =
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
            Err(ClientError::Application {
                status: status.as_u16(),
                message: parsed.message,
            })
        }
    }
}
