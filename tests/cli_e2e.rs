//! End-to-end CLI tests for the retrieve binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Send one HTTP request"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("retrieve"));
}

/// Test that a missing URL argument causes non-zero exit.
#[test]
fn test_binary_missing_url_returns_error() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// An invalid method is rejected before any request is made.
#[test]
fn test_binary_invalid_method_fails() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.args(["http://127.0.0.1:9/file", "-X", "DELETE", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid method: DELETE"));
}

/// A URL without scheme or host is rejected as invalid.
#[test]
fn test_binary_invalid_url_fails() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.args(["not-a-url", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"));
}

/// Malformed --json input fails before sending.
#[test]
fn test_binary_malformed_json_fails() {
    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.args(["http://127.0.0.1:9/file", "--json", "{not json", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[tokio::test]
async fn test_binary_downloads_into_directory() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/images/cat.png"))
        .and(query_param("size", "small"))
        .and(header("Accept", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cat".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.arg(format!("{}/images/cat.png", mock_server.uri()))
        .args(["-Q", "size=small", "-H", "Accept: image/png", "-q", "-o"])
        .arg(temp_dir.path())
        .assert()
        .success();

    assert_eq!(
        std::fs::read(temp_dir.path().join("cat.png")).unwrap(),
        b"cat"
    );
    mock_server.verify().await;
}

#[tokio::test]
async fn test_binary_posts_json_body() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("reply.json");

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({"id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cmd = Command::cargo_bin("retrieve").unwrap();
    cmd.arg(format!("{}/api", mock_server.uri()))
        .args(["-X", "post", "--json", r#"{"id": 7}"#, "-q", "-o"])
        .arg(&target)
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"{"ok":true}"#);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_binary_status_error_and_ignore_status() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("page.html");

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/gone", mock_server.uri());

    Command::cargo_bin("retrieve")
        .unwrap()
        .arg(&url)
        .args(["-q", "-o"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("received status code 410"));
    assert!(!target.exists());

    Command::cargo_bin("retrieve")
        .unwrap()
        .arg(&url)
        .args(["--ignore-status", "-q", "-o"])
        .arg(&target)
        .assert()
        .success();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "gone");
}
