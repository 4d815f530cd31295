//! Progress handler trait and events

use crate::client::Step;
use crate::metrics::PipelineId;
use std::time::Duration;

/// Events emitted while the workflow talks to the evaluation service
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A remote call was issued
    StepStarted { step: Step, detail: String },

    /// A remote call succeeded and the workflow advanced
    StepCompleted { step: Step, elapsed: Duration },

    /// A remote call failed; the workflow stays where it was
    StepFailed {
        step: Step,
        elapsed: Duration,
        error: String,
    },

    /// An evaluation result was stored in history
    ResultRecorded {
        winner: PipelineId,
        pipelines: usize,
        history_len: usize,
    },
}

/// Trait for handling workflow progress events
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
