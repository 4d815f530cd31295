//! Destinations for exported reports

use super::{Report, ReportError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Somewhere a rendered report can be handed off to
pub trait ReportSink {
    /// Stores the report and returns where it ended up
    fn offer(&self, report: &Report) -> Result<String, ReportError>;
}

/// Writes reports as files under a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, report: &Report) -> PathBuf {
        self.dir.join(&report.file_name)
    }
}

impl ReportSink for DirectorySink {
    fn offer(&self, report: &Report) -> Result<String, ReportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(report);
        fs::write(&path, report.bytes())?;

        info!(path = %path.display(), bytes = report.body.len(), "Report written");
        Ok(path.display().to_string())
    }
}
