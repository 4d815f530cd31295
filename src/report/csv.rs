//! CSV rendering and parsing of evaluation reports
//!
//! Every value is either a pipeline key or a number, so fields are written
//! without quoting. Cost keeps six decimal places; the other metrics use the
//! shortest decimal that reads back to the same `f64`.

use super::ReportError;
use crate::metrics::{EvaluationResult, PipelineId, PipelineMetrics};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;

pub const REPORT_COLUMNS: [&str; 6] = [
    "Pipeline",
    "Avg Accuracy",
    "Avg Relevance",
    "Avg Completeness",
    "Cost",
    "Composite Score",
];

pub const REPORT_MIME_TYPE: &str = "text/csv";

const DELIMITER: char = ',';
const COST_DECIMALS: usize = 6;

/// A rendered report ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: String,
}

impl Report {
    pub fn bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }
}

/// `rag-evaluation-<timestamp>.csv`, timestamp in ISO-8601 UTC with milliseconds
pub fn report_file_name(at: DateTime<Utc>) -> String {
    format!(
        "rag-evaluation-{}.csv",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Renders the report body
pub fn to_csv(result: &EvaluationResult) -> String {
    let mut lines = Vec::with_capacity(result.summary().len() + 1);
    lines.push(REPORT_COLUMNS.join(","));

    for (pipeline, metrics) in result.summary() {
        if !is_plain_field(pipeline.as_str()) {
            warn!(
                pipeline = %pipeline,
                "Pipeline key contains a delimiter or line break; the report will not parse back"
            );
        }
        lines.push(format!(
            "{}{d}{}{d}{}{d}{}{d}{:.prec$}{d}{}",
            pipeline,
            metrics.avg_accuracy,
            metrics.avg_relevance,
            metrics.avg_completeness,
            metrics.avg_cost,
            metrics.composite_score,
            d = DELIMITER,
            prec = COST_DECIMALS,
        ));
    }

    lines.join("\n")
}

/// Fields are written unquoted, so they must not contain the delimiter or a line break
fn is_plain_field(field: &str) -> bool {
    !field.contains(|c| c == DELIMITER || c == '\n' || c == '\r')
}

/// Renders the report and names it after `exported_at`
pub fn export(result: &EvaluationResult, exported_at: DateTime<Utc>) -> Report {
    Report {
        file_name: report_file_name(exported_at),
        mime_type: REPORT_MIME_TYPE,
        body: to_csv(result),
    }
}

/// One data row read back from a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub pipeline: PipelineId,
    pub metrics: PipelineMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedReport {
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
}

/// Parses a report produced by [`to_csv`]
pub fn parse_report(text: &str) -> Result<ParsedReport, ReportError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(ReportError::Empty)?;
    let header: Vec<String> = header_line
        .split(DELIMITER)
        .map(|field| field.trim().to_string())
        .collect();

    if header != REPORT_COLUMNS {
        return Err(ReportError::UnexpectedHeader {
            found: header_line.to_string(),
        });
    }

    let rows = lines
        .map(|(index, line)| parse_row(index + 1, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedReport { header, rows })
}

fn parse_row(line_no: usize, line: &str) -> Result<ReportRow, ReportError> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() != REPORT_COLUMNS.len() {
        return Err(ReportError::FieldCount {
            line: line_no,
            expected: REPORT_COLUMNS.len(),
            found: fields.len(),
        });
    }

    let number = |column: usize| -> Result<f64, ReportError> {
        fields[column]
            .parse::<f64>()
            .map_err(|_| ReportError::InvalidNumber {
                line: line_no,
                column: REPORT_COLUMNS[column],
                value: fields[column].to_string(),
            })
    };

    Ok(ReportRow {
        pipeline: PipelineId::from(fields[0]),
        metrics: PipelineMetrics::new(number(1)?, number(2)?, number(3)?, number(4)?, number(5)?),
    })
}
