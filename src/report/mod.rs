//! Exportable evaluation reports

mod csv;
mod sink;

pub use csv::{
    export, parse_report, report_file_name, to_csv, ParsedReport, Report, ReportRow,
    REPORT_COLUMNS, REPORT_MIME_TYPE,
};
pub use sink::{DirectorySink, ReportSink};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report is empty")]
    Empty,

    #[error("Unexpected report header: {found}")]
    UnexpectedHeader { found: String },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for ReportError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReportError::Empty, ReportError::Empty) => true,
            (
                ReportError::UnexpectedHeader { found: a },
                ReportError::UnexpectedHeader { found: b },
            ) => a == b,
            (
                ReportError::FieldCount {
                    line: l1,
                    expected: e1,
                    found: f1,
                },
                ReportError::FieldCount {
                    line: l2,
                    expected: e2,
                    found: f2,
                },
            ) => l1 == l2 && e1 == e2 && f1 == f2,
            (
                ReportError::InvalidNumber {
                    line: l1,
                    column: c1,
                    value: v1,
                },
                ReportError::InvalidNumber {
                    line: l2,
                    column: c2,
                    value: v2,
                },
            ) => l1 == l2 && c1 == c2 && v1 == v2,
            (ReportError::Io(a), ReportError::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
