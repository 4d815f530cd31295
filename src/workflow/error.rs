//! Workflow errors
//!
//! Every variant is recoverable: the workflow stays in the state it was in
//! before the failing call, and the same operation can be retried.

use super::state::WorkflowState;
use crate::client::{ClientError, Step};
use crate::metrics::AggregationError;
use thiserror::Error;

/// Input rejected before any request was made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one file")]
    NoFiles,

    #[error("Please add at least one question")]
    NoQuestions,
}

/// Coarse error categories for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upload,
    Ingestion,
    Evaluation,
    /// The call was refused because of workflow state, not sent
    Rejected,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Upload failed: {0}")]
    Upload(ClientError),

    #[error("Ingestion failed: {0}")]
    Ingestion(ClientError),

    #[error("Evaluation failed: {0}")]
    Evaluation(ClientError),

    #[error("Evaluation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Cannot {step} while {actual} (expected {expected})")]
    InvalidState {
        step: &'static str,
        expected: WorkflowState,
        actual: WorkflowState,
    },

    #[error("A {0} request is already in progress")]
    StepInFlight(Step),

    #[error("No evaluation result to show")]
    NoResult,
}

impl WorkflowError {
    pub(crate) fn from_step(step: Step, err: ClientError) -> Self {
        match step {
            Step::Upload => WorkflowError::Upload(err),
            Step::Ingest => WorkflowError::Ingestion(err),
            Step::Evaluate => WorkflowError::Evaluation(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Upload(_) => ErrorKind::Upload,
            WorkflowError::Ingestion(_) => ErrorKind::Ingestion,
            WorkflowError::Evaluation(_) | WorkflowError::Aggregation(_) => ErrorKind::Evaluation,
            WorkflowError::InvalidState { .. }
            | WorkflowError::StepInFlight(_)
            | WorkflowError::NoResult => ErrorKind::Rejected,
        }
    }

    /// The remote call that failed, if the error came from one
    pub fn step(&self) -> Option<Step> {
        match self {
            WorkflowError::Upload(_) => Some(Step::Upload),
            WorkflowError::Ingestion(_) => Some(Step::Ingest),
            WorkflowError::Evaluation(_) | WorkflowError::Aggregation(_) => Some(Step::Evaluate),
            _ => None,
        }
    }

    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            WorkflowError::Upload(err)
            | WorkflowError::Ingestion(err)
            | WorkflowError::Evaluation(err) => Some(err),
            _ => None,
        }
    }

    /// One-line message for users: operation name plus the service's detail
    /// when it sent one. Timeouts and unreachable hosts read the same here;
    /// the `Display` form keeps them apart for logs.
    pub fn user_message(&self) -> String {
        let operation = match self.step() {
            Some(step) => step.operation(),
            None => return self.to_string(),
        };

        match self.client_error() {
            Some(err) if err.is_transport() => {
                format!(
                    "{} failed: the evaluation service did not respond. Please try again.",
                    operation
                )
            }
            Some(err) => match err.detail() {
                Some(detail) => format!("{} failed: {}", operation, detail),
                None => format!("{} failed: {}", operation, err),
            },
            None => self.to_string(),
        }
    }
}
