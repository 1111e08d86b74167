//! Client for the contract API boundary.
//!
//! The harness talks to the API only through [`ContractApi`], so runs can be
//! driven against a live service ([`HttpContractApi`]) or an in-process mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use clausewise_core::ExtractedFields;

use crate::config::EvalConfig;

/// Multipart field name for uploaded documents.
pub const UPLOAD_FIELD: &str = "files";

/// Errors from API calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Body of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "ok".to_string()
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: default_status(),
        }
    }
}

impl HealthStatus {
    /// Any status other than an explicit failure word counts as healthy.
    pub fn is_healthy(&self) -> bool {
        !matches!(
            self.status.to_ascii_lowercase().as_str(),
            "unhealthy" | "error" | "down" | "degraded"
        )
    }
}

/// Body of `POST /ingest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    #[serde(default)]
    pub document_ids: Vec<String>,
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: String,

    /// Citation payloads are opaque to the harness; only their count matters
    #[serde(default)]
    pub citations: Vec<serde_json::Value>,
}

impl AskResponse {
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}

/// Body of `GET /metrics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMetrics {
    #[serde(default)]
    pub total_documents: u64,

    #[serde(default)]
    pub total_ingests: u64,

    /// Any further counters the service reports
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A document to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename);
        Self {
            filename,
            bytes,
            content_type,
        }
    }

    /// Read a file from disk; the upload name is the file name component.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, bytes))
    }
}

/// `application/pdf` for `.pdf` files, `text/plain` otherwise.
pub fn content_type_for(filename: &str) -> &'static str {
    if filename.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "text/plain"
    }
}

/// The contract API as seen by the harness.
#[async_trait]
pub trait ContractApi: Send + Sync {
    /// Liveness probe.
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Upload documents; returns the ids assigned by the service.
    async fn ingest(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError>;

    async fn ask(&self, question: &str) -> Result<AskResponse, ApiError>;

    async fn extract(&self, document_id: &str) -> Result<ExtractedFields, ApiError>;

    /// Audit report; its shape is owned by the service.
    async fn audit(&self, document_id: &str) -> Result<serde_json::Value, ApiError>;

    async fn metrics(&self) -> Result<ApiMetrics, ApiError>;

    /// Client name for logs.
    fn name(&self) -> &str;
}

/// HTTP implementation of [`ContractApi`].
#[derive(Debug, Clone)]
pub struct HttpContractApi {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl HttpContractApi {
    pub fn new(config: &EvalConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clausewise-eval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_root().to_string(),
            health_timeout: config.health_timeout,
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(timeout)
            } else {
                ApiError::Connect(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let timeout = self.request_timeout;
        self.send(request, timeout)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(timeout)
                } else {
                    ApiError::Decode(e.to_string())
                }
            })
    }
}

#[async_trait]
impl ContractApi for HttpContractApi {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .send(self.client.get(self.url("healthz")), self.health_timeout)
            .await?;
        // A 2xx with an unparseable body still counts as alive.
        Ok(response.json::<HealthStatus>().await.unwrap_or_default())
    }

    async fn ingest(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(file.content_type)
                .map_err(|e| ApiError::Client(e.to_string()))?;
            form = form.part(UPLOAD_FIELD, part);
        }

        let body: IngestResponse = self
            .send_json(self.client.post(self.url("ingest")).multipart(form))
            .await?;
        Ok(body.document_ids)
    }

    async fn ask(&self, question: &str) -> Result<AskResponse, ApiError> {
        self.send_json(
            self.client
                .post(self.url("ask"))
                .query(&[("question", question)]),
        )
        .await
    }

    async fn extract(&self, document_id: &str) -> Result<ExtractedFields, ApiError> {
        self.send_json(
            self.client
                .post(self.url("extract"))
                .query(&[("document_id", document_id)]),
        )
        .await
    }

    async fn audit(&self, document_id: &str) -> Result<serde_json::Value, ApiError> {
        self.send_json(
            self.client
                .post(self.url("audit"))
                .query(&[("document_id", document_id)]),
        )
        .await
    }

    async fn metrics(&self) -> Result<ApiMetrics, ApiError> {
        self.send_json(self.client.get(self.url("metrics"))).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
