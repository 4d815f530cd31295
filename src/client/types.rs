//! Wire types for the evaluation service

use crate::metrics::{PipelineId, PipelineSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote operations in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Upload,
    Ingest,
    Evaluate,
}

impl Step {
    pub fn endpoint(self) -> &'static str {
        match self {
            Step::Upload => "/upload",
            Step::Ingest => "/ingest",
            Step::Evaluate => "/evaluate",
        }
    }

    /// Operation name shown to users
    pub fn operation(self) -> &'static str {
        match self {
            Step::Upload => "Upload",
            Step::Ingest => "Ingestion",
            Step::Evaluate => "Evaluation",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Upload => "upload",
            Step::Ingest => "ingest",
            Step::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Acknowledgement from `/ingest`; only success matters to the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pipelines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub test_questions: Vec<String>,
}

/// Body of a successful `/evaluate` call. Per-question results the service
/// also sends are not used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub summary: PipelineSummary,
    #[serde(default)]
    pub winner: Option<PipelineId>,
}

/// `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub api_key_loaded: Option<bool>,
    #[serde(default)]
    pub pipelines_ready: Option<bool>,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// `GET /status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub documents_uploaded: usize,
    #[serde(default)]
    pub pipelines_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_response_ignores_extra_fields() {
        let body = r#"{
            "results": [{"pipeline_a": {"answer": "..."}}],
            "winner": "pipeline_b",
            "summary": {
                "pipeline_a": {"avg_accuracy": 7.0, "avg_relevance": 8.0, "avg_completeness": 6.5, "avg_cost": 0.000123, "composite_score": 80.0},
                "pipeline_b": {"avg_accuracy": 8.0, "avg_relevance": 8.5, "avg_completeness": 7.0, "avg_cost": 0.000456, "composite_score": 92.0}
            }
        }"#;

        let response: EvaluateResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.winner, Some(PipelineId::from("pipeline_b")));
        assert_eq!(response.summary.len(), 2);
        assert_eq!(
            response.summary.get_index(0).map(|(id, _)| id.as_str()),
            Some("pipeline_a")
        );
    }

    #[test]
    fn test_ingest_ack_tolerates_empty_object() {
        let ack: IngestAck = serde_json::from_str("{}").unwrap();
        assert!(ack.message.is_none());
        assert!(ack.pipelines.is_empty());
    }

    #[test]
    fn test_evaluate_request_shape() {
        let request = EvaluateRequest {
            test_questions: vec!["What is X?".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"test_questions": ["What is X?"]})
        );
    }

    #[test]
    fn test_step_names() {
        assert_eq!(Step::Evaluate.endpoint(), "/evaluate");
        assert_eq!(Step::Ingest.operation(), "Ingestion");
        assert_eq!(Step::Upload.to_string(), "upload");
    }
}
