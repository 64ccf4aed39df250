//! End-to-end CLI tests for the restclient binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use support::socket_guard::start_mock_server_or_skip;

/// Builds the command with an isolated, empty config directory.
fn restclient(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("restclient").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    restclient(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Send one HTTP request"));
}

#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    restclient(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("restclient"));
}

#[test]
fn test_binary_requires_method_and_url() {
    let config_home = TempDir::new().unwrap();
    restclient(&config_home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_download_requires_output() {
    let config_home = TempDir::new().unwrap();
    restclient(&config_home)
        .args(["download", "http://127.0.0.1:9/file.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_binary_rejects_invalid_config_file() {
    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("restclient");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "timeout_secs = 0\n").unwrap();

    restclient(&config_home)
        .args(["get", "http://127.0.0.1:9/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_post_prints_status_and_body() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("x-trace", "cli"))
        .and(header("x-tenant", "from-config"))
        .and(body_string(r#"{"name":"widget"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":1,"name":"widget"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let dir = config_home.path().join("restclient");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "header.X-Tenant = \"from-config\"\ntimeout_secs = 10\n",
    )
    .unwrap();

    let url = format!("{}/items", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        restclient(&config_home)
            .args(["post", &url, "-d", r#"{"name":"widget"}"#, "-H", "X-Trace: cli", "-q"])
            .assert()
            .success()
            .stdout(predicate::str::contains("HTTP 201"))
            .stdout(predicate::str::contains(r#"{"id":1,"name":"widget"}"#));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_download_prints_saved_path() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/data.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2\n"))
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let destination = out_dir.path().join("data.csv");
    let url = format!("{}/data.csv", mock_server.uri());
    let output = destination.clone();
    tokio::task::spawn_blocking(move || {
        restclient(&config_home)
            .args(["download", &url, "-q", "-o"])
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("data.csv"));
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "a,b\n1,2\n");
}
