//! End-to-end tests of the worker binary.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BIN: &str = env!("CARGO_BIN_EXE_vgen-worker");

/// rsync stand-in: records that it ran, then runs `body`.
fn fake_rsync(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-rsync");
    let marker = dir.join("rsync-called");
    fs::write(
        &path,
        format!("#!/bin/sh\ntouch '{}'\n{}\n", marker.display(), body),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn run_worker(dir: &TempDir, server: &MockServer, rsync: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .current_dir(dir.path())
        .env("API_URL", format!("{}/api/generate-video", server.uri()))
        .env("API_TIMEOUT_SECS", "5")
        .env("RSYNC_BIN", rsync)
        .env("RSYNC_SOURCE", dir.path().join("output"))
        .env("RSYNC_DEST", "deploy@web:~/web/x")
        .env("SSH_KEY_PATH", dir.path().join("id_rsa"))
        .env("RSYNC_TIMEOUT_SECS", "10")
        .env("LOG_FILE", dir.path().join("logs/video_generator.log"))
        .env("SCHEDULE_TIME", "14:00")
        .env("LOG_FORMAT", "text")
        .env("RUST_LOG", "info")
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_help_makes_no_calls() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let rsync = fake_rsync(dir.path(), "exit 0");

    let output = run_worker(&dir, &server, &rsync, &["--help"]).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--run-once"));
    assert!(stdout.contains(&server.uri()));
    assert!(stdout.contains("deploy@web:~/web/x"));
    assert!(!dir.path().join("rsync-called").exists());
    assert!(!dir.path().join("logs").exists());
}

#[tokio::test]
async fn test_run_once_success_exits_zero() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&server)
        .await;
    let rsync = fake_rsync(dir.path(), r#"echo "sent $# args""#);

    let output = run_worker(&dir, &server, &rsync, &["--run-once"]).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("rsync-called").exists());

    let log = fs::read_to_string(dir.path().join("logs/video_generator.log")).unwrap();
    assert!(log.contains("Video generation finished: 4/4 succeeded"));
    assert!(log.contains("File sync succeeded"));
}

#[tokio::test]
async fn test_run_once_http_500_exits_one() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({ "category": "水产" })))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;
    let rsync = fake_rsync(dir.path(), "exit 0");

    let output = run_worker(&dir, &server, &rsync, &["--run-once"]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("rsync-called").exists());
}

#[tokio::test]
async fn test_run_once_sync_failure_exits_one() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&server)
        .await;
    let rsync = fake_rsync(dir.path(), "echo 'Permission denied (publickey)' >&2\nexit 255");

    let output = run_worker(&dir, &server, &rsync, &["--run-once"]).await;

    assert_eq!(output.status.code(), Some(1));
    let log = fs::read_to_string(dir.path().join("logs/video_generator.log")).unwrap();
    assert!(log.contains("Permission denied (publickey)"));
}

#[tokio::test]
async fn test_log_file_is_rotated_on_restart() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let rsync = fake_rsync(dir.path(), "exit 0");

    run_worker(&dir, &server, &rsync, &["--run-once"]).await;
    run_worker(&dir, &server, &rsync, &["--run-once"]).await;

    assert!(dir.path().join("logs/video_generator.log").exists());
    assert!(dir.path().join("logs/video_generator.log.1").exists());
}

#[tokio::test]
async fn test_invalid_schedule_time_exits_one() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let rsync = fake_rsync(dir.path(), "exit 0");

    let output = Command::new(BIN)
        .current_dir(dir.path())
        .env("API_URL", server.uri())
        .env("RSYNC_BIN", &rsync)
        .env("SCHEDULE_TIME", "half past two")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SCHEDULE_TIME"));
}

#[tokio::test]
async fn test_run_once_missing_rsync_exits_one() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&server)
        .await;
    let missing = dir.path().join("no-such-rsync");

    let output = run_worker(&dir, &server, &missing, &["--run-once"]).await;

    assert_eq!(output.status.code(), Some(1));
    let log = fs::read_to_string(dir.path().join("logs/video_generator.log")).unwrap();
    assert!(log.contains("Video generation finished: 4/4 succeeded"));
    assert!(log.contains("File sync error"));
}
