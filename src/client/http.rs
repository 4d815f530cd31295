//! HTTP client for the RAG evaluation service
//!
//! Maps each workflow step onto one request against the service's REST API and
//! applies the step's own timeout. Ingestion embeds and indexes every uploaded
//! file into every pipeline, so it gets the longest budget.
//!
//! # Example
//!
//! ```no_run
//! use rag_optimizer::client::{EvaluationBackend, HttpEvaluationClient, Timeouts};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpEvaluationClient::new("http://localhost:8000", Timeouts::default())?;
//!
//! client.ingest().await?;
//! let response = client.evaluate(&["What is the main topic?".to_string()]).await?;
//! println!("{} pipelines evaluated", response.summary.len());
//! # Ok(())
//! # }
//! ```

use super::backend::EvaluationBackend;
use super::error::ClientError;
use super::types::{
    EvaluateRequest, EvaluateResponse, IngestAck, ServiceHealth, ServiceStatus, Step,
    UploadResponse,
};
use crate::documents::DocumentFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_INGEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_EVALUATE_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;

/// Per-call timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub upload: Duration,
    pub ingest: Duration,
    pub evaluate: Duration,
    pub health: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            ingest: Duration::from_secs(DEFAULT_INGEST_TIMEOUT_SECS),
            evaluate: Duration::from_secs(DEFAULT_EVALUATE_TIMEOUT_SECS),
            health: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }
}

impl Timeouts {
    pub fn for_step(&self, step: Step) -> Duration {
        match step {
            Step::Upload => self.upload,
            Step::Ingest => self.ingest,
            Step::Evaluate => self.evaluate,
        }
    }
}

/// Evaluation service client over HTTP
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct HttpEvaluationClient {
    base_url: Url,
    http_client: Client,
    timeouts: Timeouts,
}

impl HttpEvaluationClient {
    /// Creates a client for the service at `base_url`
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidRequest {
            message: format!("Invalid service URL '{}': {}", base_url, e),
        })?;

        let http_client = Client::builder()
            .build()
            .map_err(|e| ClientError::InvalidRequest {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url,
            http_client,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends a request and returns the body of a 2xx response, mapping every
    /// failure to `ClientError`
    async fn send(
        &self,
        label: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<String, ClientError> {
        let start = Instant::now();

        let response = request.timeout(timeout).send().await.map_err(|e| {
            let err = ClientError::from_reqwest(e, timeout);
            error!(call = label, error = %err, "Request to evaluation service failed");
            err
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, timeout))?;

        debug!(
            call = label,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            body_len = body.len(),
            "Received response from evaluation service"
        );

        if !status.is_success() {
            let detail = extract_detail(&body);
            error!(
                call = label,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "Evaluation service returned error status"
            );
            return Err(ClientError::Api {
                status_code: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }

    /// Like [`send`](Self::send), then decodes the body as JSON
    async fn send_json<T: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        let body = self.send(label, request, timeout).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
            message: format!("Failed to decode {} response: {}", label, e),
        })
    }
}

/// Reads the `/ingest` acknowledgement. Any 2xx means the documents were
/// ingested, so a body that does not match `IngestAck` is only logged.
fn decode_ingest_ack(body: &str) -> IngestAck {
    if body.trim().is_empty() {
        return IngestAck::default();
    }

    serde_json::from_str(body).unwrap_or_else(|e| {
        debug!(error = %e, "Ignoring unrecognized ingest acknowledgement");
        IngestAck::default()
    })
}

/// Pulls the human-readable error out of an error body.
///
/// FastAPI-style services answer `{"detail": "..."}`; validation failures put a
/// structured value there instead, which is kept as compact JSON.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        _ => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl EvaluationBackend for HttpEvaluationClient {
    async fn upload(&self, files: &[DocumentFile]) -> Result<Vec<String>, ClientError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.content.to_vec())
                .file_name(file.name.clone())
                .mime_str(file.kind.mime_type())
                .map_err(|e| ClientError::InvalidRequest {
                    message: format!("Cannot attach {}: {}", file.name, e),
                })?;
            form = form.part("files", part);
        }

        info!(files = files.len(), "Uploading documents");

        let request = self.http_client.post(self.url(Step::Upload.endpoint())).multipart(form);
        let response: UploadResponse = self
            .send_json("upload", request, self.timeouts.upload)
            .await?;

        Ok(response.files)
    }

    async fn ingest(&self) -> Result<IngestAck, ClientError> {
        info!(
            timeout_secs = self.timeouts.ingest.as_secs(),
            "Starting ingestion"
        );

        let request = self.http_client.post(self.url(Step::Ingest.endpoint()));
        let body = self.send("ingest", request, self.timeouts.ingest).await?;
        Ok(decode_ingest_ack(&body))
    }

    async fn evaluate(&self, questions: &[String]) -> Result<EvaluateResponse, ClientError> {
        info!(
            questions = questions.len(),
            timeout_secs = self.timeouts.evaluate.as_secs(),
            "Evaluating pipelines"
        );

        let body = EvaluateRequest {
            test_questions: questions.to_vec(),
        };
        let request = self
            .http_client
            .post(self.url(Step::Evaluate.endpoint()))
            .json(&body);
        self.send_json("evaluate", request, self.timeouts.evaluate)
            .await
    }

    async fn health(&self) -> Result<ServiceHealth, ClientError> {
        let request = self.http_client.get(self.url("/"));
        self.send_json("health", request, self.timeouts.health).await
    }

    async fn status(&self) -> Result<ServiceStatus, ClientError> {
        let request = self.http_client.get(self.url("/status"));
        self.send_json("status", request, self.timeouts.health).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
