//! CLI smoke tests for the `dt` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `dt` isolated from the user's config, data dir and working directory
fn dt(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dt").expect("dt binary builds");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    dt(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat with a locally hosted Ollama model"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_rejects_out_of_range_temperature() {
    let home = TempDir::new().unwrap();
    dt(&home)
        .args(["--temperature", "1.5", "ask", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_ask_blank_message_fails() {
    let home = TempDir::new().unwrap();
    dt(&home)
        .args(["ask", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to ask"));
}

#[test]
fn test_ask_unreachable_runtime_reports_connection_notice() {
    let home = TempDir::new().unwrap();
    let output = dt(&home)
        .args(["--base-url", "http://127.0.0.1:1", "ask", "안녕"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Ollama 연결 오류").count(), 1, "stderr: {stderr}");
    assert!(stderr.contains("turn failed"));
}

#[test]
fn test_config_file_is_read_from_working_directory() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".deeptok.yml"), "llm:\n  temperature: 3.0\n").unwrap();

    dt(&home)
        .args(["ask", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("llm.temperature"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_json_prints_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "안녕하세요",
            "done": true,
            "eval_count": 2
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = dt(&home);
    cmd.args(["--base-url", &server.uri(), "ask", "안녕", "--format", "json"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().expect("dt runs"))
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let transcript: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(transcript["model"], "deepseek-r1:1.5b");
    assert_eq!(transcript["turns"][0]["role"], "user");
    assert_eq!(transcript["turns"][0]["content"], "안녕");
    assert_eq!(transcript["turns"][1]["role"], "assistant");
    assert_eq!(transcript["turns"][1]["content"], "안녕하세요");
    assert_eq!(transcript["usage"]["output_tokens"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_models_marks_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "deepseek-r1:1.5b" }, { "name": "llama3" }]
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = dt(&home);
    cmd.args(["--base-url", &server.uri(), "models"]);

    let output = tokio::task::spawn_blocking(move || cmd.output().expect("dt runs"))
        .await
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deepseek-r1:1.5b"));
    assert!(stdout.contains("llama3"));
}
