pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, HealthArgs, ReportArgs, RunArgs};
pub use output::{HealthStatus, OutputFormat, OutputFormatter};
