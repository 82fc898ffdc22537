//! HTTP OCR backend.
//!
//! Posts files as `multipart/form-data` (field `file`) to the configured
//! backend routes.

use super::error::BackendError;
use super::provider::{BackendHealth, DocumentPayload, OcrBackend, UploadedFile};
use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Multipart field name the backend reads the upload from.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: Option<String>,
}

/// OCR backend reached over HTTP.
#[derive(Debug)]
pub struct HttpOcrBackend {
    client: reqwest::Client,
    base_url: Url,
    config: BackendConfig,
}

impl HttpOcrBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BackendError::InvalidRequest(format!("Invalid backend URL '{}': {e}", config.base_url))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidRequest(format!("Invalid backend path '{path}': {e}")))
    }

    fn form(file: &UploadedFile) -> Result<reqwest::multipart::Form, BackendError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        Ok(reqwest::multipart::Form::new().part(FILE_FIELD, part))
    }

    /// One POST, no retries. Non-success statuses become [`BackendError::Status`].
    async fn post_file(
        &self,
        path: &str,
        file: &UploadedFile,
    ) -> Result<reqwest::Response, BackendError> {
        let url = self.endpoint(path)?;
        let form = Self::form(file)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(BackendError::from_status(status, &body))
    }
}

#[async_trait]
impl OcrBackend for HttpOcrBackend {
    async fn extract_text(&self, file: &UploadedFile) -> Result<String, BackendError> {
        let response = self.post_file(&self.config.extract_path, file).await?;
        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(body.text)
    }

    async fn extract_document(
        &self,
        file: &UploadedFile,
    ) -> Result<DocumentPayload, BackendError> {
        let response = self.post_file(&self.config.document_path, file).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(DocumentPayload {
            bytes,
            content_type,
        })
    }

    async fn health(&self) -> BackendHealth {
        let url = match self.endpoint(&self.config.health_path) {
            Ok(url) => url,
            Err(e) => {
                return BackendHealth {
                    reachable: false,
                    status: None,
                    message: Some(e.to_string()),
                };
            }
        };

        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                let message = response
                    .json::<HealthResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.message);
                BackendHealth {
                    reachable: status.is_success(),
                    status: Some(status.as_u16()),
                    message,
                }
            }
            Err(e) => BackendHealth {
                reachable: false,
                status: None,
                message: Some(e.to_string()),
            },
        }
    }
}
