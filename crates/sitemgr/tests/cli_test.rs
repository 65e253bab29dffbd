//! Integration tests for the `sitemgr` CLI binary.
//!
//! Argument parsing, help, completions and error mapping run without a
//! network. The API-backed cases point `--base-url` at a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sitemgr` binary with env isolation.
///
/// Clears all `SITEMGR_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn sitemgr_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sitemgr");
    cmd.env("HOME", "/tmp/sitemgr-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sitemgr-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("SITEMGR_PROFILE")
        .env_remove("SITEMGR_BASE_URL")
        .env_remove("SITEMGR_API_KEY")
        .env_remove("SITEMGR_OUTPUT")
        .env_remove("SITEMGR_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut full = vec![
        "--base-url".to_owned(),
        server.uri(),
        "--api-key".to_owned(),
        "test-api-key".to_owned(),
    ];
    full.extend(args.iter().map(|a| (*a).to_owned()));

    tokio::task::spawn_blocking(move || sitemgr_cmd().args(&full).output().unwrap())
        .await
        .unwrap()
}

async fn mount(server: &MockServer, endpoint: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("X-API-KEY", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

async fn mount_office(server: &MockServer) {
    mount(
        server,
        "/ea/sites",
        json!([{
            "siteId": "S1",
            "hostId": "H1",
            "meta": { "name": "default" },
            "statistics": { "counts": { "totalDevice": 1, "offlineDevice": 0 } },
            "permission": "admin"
        }]),
    )
    .await;
    mount(
        server,
        "/ea/hosts",
        json!([{ "id": "H1", "reportedState": { "hostname": "Office" } }]),
    )
    .await;
    mount(
        server,
        "/ea/devices",
        json!([{
            "hostId": "H1",
            "devices": [{ "id": "D1", "mac": "aa:bb", "name": "sw1", "status": "online" }]
        }]),
    )
    .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sitemgr_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    sitemgr_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Site Manager")
            .and(predicate::str::contains("sites"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("sdwan"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    sitemgr_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitemgr"));
}

#[test]
fn test_completions_bash() {
    sitemgr_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_subcommands_exist() {
    sitemgr_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-key"))
                .and(predicate::str::contains("path")),
        );
}

#[test]
fn test_config_path_is_printed() {
    sitemgr_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_no_config() {
    sitemgr_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = sitemgr_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = sitemgr_cmd()
        .args(["--output", "invalid", "sites"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_missing_api_key_exits_with_auth_code() {
    let output = sitemgr_cmd().arg("sites").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No API key"));
}

#[test]
fn test_bad_base_url_is_usage_error() {
    let output = sitemgr_cmd()
        .args(["--base-url", "ftp://example.com", "--api-key", "k", "sites"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn test_unknown_explicit_profile() {
    sitemgr_cmd()
        .args(["--profile", "nope", "sites"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_watch_rejects_zero_interval() {
    let output = sitemgr_cmd()
        .args(["--api-key", "k", "watch", "--interval", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

// ── Against a mock API ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_json_output() {
    let server = MockServer::start().await;
    mount_office(&server).await;

    let output = run_against(&server, &["--output", "json", "sites"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let sites: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sites[0]["id"], "S1");
    assert_eq!(sites[0]["host_id"], "H1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_entities_plain_lists_unique_ids() {
    let server = MockServer::start().await;
    mount_office(&server).await;

    let output = run_against(&server, &["--output", "plain", "entities"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<_> = stdout.lines().collect();
    assert_eq!(ids, ["S1", "S1_aa:bb", "S1_isp_metrics"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ea/sites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "unauthorized",
            "message": "invalid key"
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["sites"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metrics_for_unknown_site_is_not_found() {
    let server = MockServer::start().await;
    mount_office(&server).await;

    let output = run_against(&server, &["metrics", "S9"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = MockServer::start().await;
    mount_office(&server).await;

    let output = run_against(
        &server,
        &["--output", "json", "watch", "--interval", "1", "--count", "2"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let cycles: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0]["cycle"], 1);
    assert_eq!(cycles[1]["cycle"], 2);
    assert_eq!(cycles[1]["entities"], 3);
    assert_eq!(cycles[1]["registered"], 3);
}
