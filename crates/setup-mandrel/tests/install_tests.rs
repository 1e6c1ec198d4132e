//! End-to-end command runs against a mock GitHub and a temporary tool cache.

use clap::Parser;
use flate2::Compression;
use flate2::write::GzEncoder;
use setup_mandrel::cli::{EXIT_CLI, EXIT_SETUP, exit_code_for};
use setup_mandrel::{Cli, run};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jdk_tar_gz() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let files: [(&str, &[u8]); 2] = [
        ("mandrel-java21-23.1.2.0-Final/bin/native-image", b"#!/bin/sh\n"),
        ("mandrel-java21-23.1.2.0-Final/release", b"JAVA_VERSION=\"21\"\n"),
    ];
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

async fn mock_github() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/graalvm/mandrel/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tag_name": "mandrel-23.1.2.0-Final"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/download/mandrel-23.1.2.0/mandrel-java21-linux-amd64-23.1.2.0.tar.gz",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jdk_tar_gz()))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn args(server: &MockServer, cache: &Path, rest: &[&str]) -> Cli {
    let api = server.uri();
    let base = format!("{}/download", server.uri());
    let mut argv: Vec<&str> = vec![
        "setup-mandrel",
        "--platform",
        "linux",
        "--arch",
        "amd64",
        "--api-url",
        api.as_str(),
        "--download-base",
        base.as_str(),
        "--cache-dir",
        cache.to_str().unwrap(),
    ];
    argv.extend_from_slice(rest);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_install_latest_exports_to_workflow_files() {
    let server = mock_github().await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("toolcache");
    let env_file = dir.path().join("github_env");
    let path_file = dir.path().join("github_path");
    let downloads = dir.path().join("tmp");

    let cli = args(&server, &cache, &["install", "latest", "--java-version", "21"]);
    let output = temp_env::async_with_vars(
        [
            ("GITHUB_ENV", Some(env_file.as_os_str())),
            ("GITHUB_PATH", Some(path_file.as_os_str())),
            ("RUNNER_TEMP", Some(downloads.as_os_str())),
        ],
        run(&cli),
    )
    .await
    .unwrap();

    let home = cache.join("mandrel-java21-linux/23.1.2.0/x64");
    assert_eq!(output.text, home.display().to_string());
    assert_eq!(output.data["version"], "23.1.2.0");
    assert_eq!(output.data["toolName"], "mandrel-java21-linux");
    assert_eq!(output.data["exported"], true);
    assert!(home.join("bin/native-image").is_file());

    let env = std::fs::read_to_string(&env_file).unwrap();
    assert!(env.contains(&format!("JAVA_HOME={}\n", home.display())));
    assert!(env.contains(&format!("GRAALVM_HOME={}\n", home.display())));
    assert_eq!(
        std::fs::read_to_string(&path_file).unwrap(),
        format!("{}\n", home.join("bin").display())
    );
}

#[tokio::test]
async fn test_second_install_is_served_from_cache() {
    let server = mock_github().await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("toolcache");
    let downloads = dir.path().join("tmp");

    let cli = args(&server, &cache, &["install", "23.1.2.0", "-j", "21"]);
    for _ in 0..2 {
        temp_env::async_with_vars(
            [
                ("GITHUB_ENV", None),
                ("GITHUB_PATH", None),
                ("RUNNER_TEMP", Some(downloads.as_os_str())),
            ],
            run(&cli),
        )
        .await
        .unwrap();
    }

    let listed = run(&args(&server, &cache, &["list", "-j", "21"])).await.unwrap();
    assert_eq!(listed.text, "23.1.2.0");
    // The download mock expects exactly one request; verified on drop.
}

#[tokio::test]
async fn test_locate_prints_coordinates_without_download() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let cli = args(
        &server,
        dir.path(),
        &["locate", "21.3.0.0-Final", "--java-version", "17"],
    );
    let output = run(&cli).await.unwrap();

    assert!(output.text.contains("mandrel-java17-linux-amd64-21.3.0.0-Final"));
    assert_eq!(output.data["toolName"], "mandrel-java17-linux");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_missing_prefix_exits_with_setup_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/graalvm/mandrel/git/matching-refs/tags/mandrel-9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let err = run(&args(&server, dir.path(), &["resolve", "9.9"]))
        .await
        .unwrap_err();

    assert_eq!(exit_code_for(&err), EXIT_SETUP);
    assert!(err.to_string().contains("'9.9'"));
}

#[tokio::test]
async fn test_export_without_workflow_files_is_config_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let cli = args(
        &server,
        dir.path(),
        &["install", "23.1.2.0", "-j", "21", "--export"],
    );
    let err = temp_env::async_with_vars(
        [("GITHUB_ENV", None::<&str>), ("GITHUB_PATH", None)],
        run(&cli),
    )
    .await
    .unwrap_err();

    assert_eq!(exit_code_for(&err), EXIT_CLI);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
