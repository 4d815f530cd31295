use crate::client::Step;
use serde::Serialize;
use std::fmt;

/// Where the evaluation workflow currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    AwaitingUpload,
    AwaitingIngest,
    AwaitingQuestions,
    ShowingResults,
}

impl WorkflowState {
    /// The remote call that moves the workflow out of this state
    pub fn pending_step(self) -> Option<Step> {
        match self {
            WorkflowState::AwaitingUpload => Some(Step::Upload),
            WorkflowState::AwaitingIngest => Some(Step::Ingest),
            WorkflowState::AwaitingQuestions => Some(Step::Evaluate),
            WorkflowState::ShowingResults => None,
        }
    }

    /// The state in which `step` may be called
    pub fn awaiting(step: Step) -> Self {
        match step {
            Step::Upload => WorkflowState::AwaitingUpload,
            Step::Ingest => WorkflowState::AwaitingIngest,
            Step::Evaluate => WorkflowState::AwaitingQuestions,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::AwaitingUpload => "awaiting upload",
            WorkflowState::AwaitingIngest => "awaiting ingest",
            WorkflowState::AwaitingQuestions => "awaiting questions",
            WorkflowState::ShowingResults => "showing results",
        };
        f.write_str(label)
    }
}
