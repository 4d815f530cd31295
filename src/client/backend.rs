use super::error::ClientError;
use super::types::{EvaluateResponse, IngestAck, ServiceHealth, ServiceStatus};
use crate::documents::DocumentFile;
use async_trait::async_trait;

/// The remote calls the workflow depends on.
///
/// Each method is a single request/response. Implementations apply their own
/// per-call timeout and never retry.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    /// Sends documents to `/upload`, returning the names the service stored them under
    async fn upload(&self, files: &[DocumentFile]) -> Result<Vec<String>, ClientError>;

    async fn ingest(&self) -> Result<IngestAck, ClientError>;

    async fn evaluate(&self, questions: &[String]) -> Result<EvaluateResponse, ClientError>;

    async fn health(&self) -> Result<ServiceHealth, ClientError>;

    async fn status(&self) -> Result<ServiceStatus, ClientError>;

    fn name(&self) -> &str;
}
