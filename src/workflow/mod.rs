//! Upload, ingest and evaluate workflow

mod controller;
mod error;
mod state;

pub use crate::client::Step;
pub use controller::{StagedFiles, WorkflowController};
pub use error::{ErrorKind, ValidationError, WorkflowError};
pub use state::WorkflowState;
