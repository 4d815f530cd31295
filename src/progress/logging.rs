//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StepStarted { step, detail } => {
                info!(step = %step, detail = %detail, "Step started");
            }
            ProgressEvent::StepCompleted { step, elapsed } => {
                info!(
                    step = %step,
                    elapsed_ms = elapsed.as_millis(),
                    "Step complete"
                );
            }
            ProgressEvent::StepFailed {
                step,
                elapsed,
                error,
            } => {
                warn!(
                    step = %step,
                    elapsed_ms = elapsed.as_millis(),
                    error = %error,
                    "Step failed"
                );
            }
            ProgressEvent::ResultRecorded {
                winner,
                pipelines,
                history_len,
            } => {
                info!(
                    winner = %winner,
                    pipelines,
                    history_len,
                    "Evaluation result recorded"
                );
            }
        }
    }
}
