//! CLI integration tests
//!
//! These tests run the compiled binary and check command parsing, output
//! formats and exit codes.

use std::fs;
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rag_optimizer() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rag-optimizer"));
    cmd.env_remove("RAG_OPTIMIZER_API_URL")
        .env_remove("RUST_LOG")
        .env("RAG_OPTIMIZER_LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_cli_help() {
    let output = rag_optimizer()
        .arg("--help")
        .output()
        .expect("Failed to execute rag-optimizer");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rag-optimizer"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("health"));
    assert!(stdout.contains("report"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_cli_version() {
    let output = rag_optimizer()
        .arg("--version")
        .output()
        .expect("Failed to execute rag-optimizer");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_without_files_is_usage_error() {
    let output = rag_optimizer()
        .args(["run", "--question", "What is X?"])
        .output()
        .expect("Failed to execute rag-optimizer");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_api_url_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "text").unwrap();

    let output = rag_optimizer()
        .args(["--api-url", "not-a-url", "run", "--question", "q", "--file"])
        .arg(&file)
        .output()
        .expect("Failed to execute rag-optimizer");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"));
}

#[test]
fn test_config_command_json() {
    let output = rag_optimizer()
        .args(["--api-url", "http://eval.internal:9000", "config", "--format", "json"])
        .output()
        .expect("Failed to execute rag-optimizer");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["api_url"], "http://eval.internal:9000");
}

#[test]
fn test_config_command_reports_invalid_url() {
    let output = rag_optimizer()
        .args(["--api-url", "ftp://files.example.com", "config"])
        .output()
        .expect("Failed to execute rag-optimizer");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ftp://files.example.com"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"));
}

#[test]
fn test_report_command_json() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("rag-evaluation-2025-01-15T10:30:00.000Z.csv");
    fs::write(
        &report,
        "Pipeline,Avg Accuracy,Avg Relevance,Avg Completeness,Cost,Composite Score\n\
         pipeline_a,7.5,8,7,0.000420,80\n\
         pipeline_b,8.5,9,8,0.000510,92\n",
    )
    .unwrap();

    let output = rag_optimizer()
        .args(["report", "--format", "json"])
        .arg(&report)
        .output()
        .expect("Failed to execute rag-optimizer");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["rows"][1]["pipeline"], "pipeline_b");
    assert_eq!(parsed["rows"][1]["metrics"]["composite_score"], 92.0);
}

#[test]
fn test_report_command_rejects_foreign_csv() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("other.csv");
    fs::write(&report, "name,value\nx,1\n").unwrap();

    let output = rag_optimizer()
        .arg("report")
        .arg(&report)
        .output()
        .expect("Failed to execute rag-optimizer");

    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_run_and_export_against_mock_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": ["faq.txt"] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "summary": {
                "pipeline_a": {
                    "avg_accuracy": 7.0, "avg_relevance": 7.0, "avg_completeness": 7.0,
                    "avg_cost": 0.0002, "composite_score": 71.5
                },
                "pipeline_b": {
                    "avg_accuracy": 9.0, "avg_relevance": 9.0, "avg_completeness": 9.0,
                    "avg_cost": 0.0004, "composite_score": 90.25
                }
            }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("faq.txt");
    fs::write(&file, "Refunds take five days.").unwrap();
    let export_dir = dir.path().join("reports");

    let uri = server.uri();
    let mut cmd = rag_optimizer();
    cmd.args(["--api-url", uri.as_str(), "run", "--format", "json"])
        .arg("--file")
        .arg(&file)
        .args(["--question", "How long do refunds take?"])
        .arg("--export")
        .arg(&export_dir);

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .expect("Failed to execute rag-optimizer");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["winner"], "pipeline_b");

    let exported: Vec<_> = fs::read_dir(&export_dir).unwrap().collect();
    assert_eq!(exported.len(), 1);
}
