//! Evaluation service client
//!
//! A trait-based seam over the remote upload/ingest/evaluate calls so the
//! workflow can run against the HTTP service or the in-process mock.

mod backend;
mod error;
mod http;
mod mock;
mod types;

pub use backend::EvaluationBackend;
pub use error::ClientError;
pub use http::{
    HttpEvaluationClient, Timeouts, DEFAULT_EVALUATE_TIMEOUT_SECS, DEFAULT_HEALTH_TIMEOUT_SECS,
    DEFAULT_INGEST_TIMEOUT_SECS, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
pub use mock::{Hold, MockEvaluationClient};
pub use types::{
    EvaluateRequest, EvaluateResponse, IngestAck, ServiceHealth, ServiceStatus, Step,
    UploadResponse,
};
