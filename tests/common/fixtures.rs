//! API response fixtures and a mock API server

use serde_json::{Value, json};
use setu_fetch::{Config, RetryConfig};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock server answers on
pub const API_PATH: &str = "/setu/v2";

/// A full record as the real API returns it
pub fn full_record(pid: u64, p: u64) -> Value {
    json!({
        "pid": pid,
        "p": p,
        "uid": 1000,
        "title": "夏の空",
        "author": "作者",
        "r18": true,
        "width": 1200,
        "height": 1600,
        "tags": ["オリジナル", "風景"],
        "ext": "jpg",
        "aiType": 0,
        "uploadDate": 1_700_000_000_000u64,
        "urls": {"regular": format!("https://i.pixiv.re/img-master/img/2023/01/01/00/00/00/{pid}_p{p}_master1200.jpg")}
    })
}

/// Start a server that answers every request with `{"error": "", "data": data}`
pub async fn serve_batch(data: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "", "data": data})))
        .mount(&server)
        .await;
    server
}

/// Configuration pointing at `server` with millisecond delays and a temp output dir
pub fn fast_config(server: &MockServer, temp_dir: &TempDir, iterations: u32) -> Config {
    Config {
        api_url: format!("{}{}", server.uri(), API_PATH),
        iterations,
        iteration_delay: Duration::from_millis(5),
        request_timeout: Duration::from_secs(5),
        retry: RetryConfig {
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
        },
        output_dir: temp_dir.path().join("data"),
        index_path: Some(temp_dir.path().join("index.json")),
        ..Default::default()
    }
}

/// Parse an artifact from the output directory
pub fn read_artifact(temp_dir: &TempDir, name: &str) -> Value {
    let text = std::fs::read_to_string(temp_dir.path().join("data").join(name))
        .unwrap_or_else(|e| panic!("artifact {name} should exist: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("artifact {name} is not JSON: {e}"))
}

/// Names of all files in the output directory
pub fn artifact_files(temp_dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(temp_dir.path().join("data"))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
