//! End-to-end runs of the fetch loop against a mock API

mod common;

use common::*;
use serde_json::json;
use setu_fetch::{RunEnd, SetuFetcher, run_until, run_until_interrupted};
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn single_record_produces_one_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([
        {"pid": 123, "p": 0, "urls": {"regular": "https://i.pixiv.re/img/123_p0.jpg"}}
    ]))
    .await;

    let fetcher = SetuFetcher::new(fast_config(&server, &temp_dir, 1)).unwrap();
    let summary = fetcher.run().await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(artifact_files(&temp_dir), vec!["123_0.json"]);

    let artifact = read_artifact(&temp_dir, "123_0.json");
    assert_eq!(artifact["url"], "/img/123_p0.jpg");
    assert_eq!(artifact["pid"], 123);
    assert_eq!(artifact["urls"]["regular"], "https://i.pixiv.re/img/123_p0.jpg");
}

#[tokio::test]
async fn record_without_urls_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([{"pid": 99, "p": 0, "title": "no urls"}])).await;

    let fetcher = SetuFetcher::new(fast_config(&server, &temp_dir, 1)).unwrap();
    let summary = fetcher.run().await.unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.mean_per_record(), None);
    assert!(artifact_files(&temp_dir).is_empty());

    let index = std::fs::read_to_string(temp_dir.path().join("index.json")).unwrap();
    assert_eq!(index, "[]");
}

#[tokio::test]
async fn full_records_keep_every_field_and_unicode() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([full_record(100177233, 0), full_record(100177233, 1)])).await;

    let fetcher = SetuFetcher::new(fast_config(&server, &temp_dir, 1)).unwrap();
    fetcher.run().await.unwrap();

    assert_eq!(
        artifact_files(&temp_dir),
        vec!["100177233_0.json", "100177233_1.json"]
    );

    let raw =
        std::fs::read_to_string(temp_dir.path().join("data").join("100177233_1.json")).unwrap();
    assert!(raw.contains("夏の空"));
    assert!(!raw.contains("\\u"));

    let artifact = read_artifact(&temp_dir, "100177233_1.json");
    assert_eq!(
        artifact["url"],
        "/img-master/img/2023/01/01/00/00/00/100177233_p1_master1200.jpg"
    );
    assert_eq!(artifact["tags"], json!(["オリジナル", "風景"]));
    assert_eq!(artifact["uploadDate"], 1_700_000_000_000u64);
}

#[tokio::test]
async fn rerun_overwrites_previous_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([full_record(5, 0)])).await;

    SetuFetcher::new(fast_config(&server, &temp_dir, 1))
        .unwrap()
        .run()
        .await
        .unwrap();
    let first = read_artifact(&temp_dir, "5_0.json");

    SetuFetcher::new(fast_config(&server, &temp_dir, 2))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(artifact_files(&temp_dir), vec!["5_0.json"]);
    assert_eq!(read_artifact(&temp_dir, "5_0.json"), first);
}

#[tokio::test]
async fn run_until_interrupted_completes_without_signal() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([full_record(1, 0), full_record(2, 0)])).await;

    let fetcher = SetuFetcher::new(fast_config(&server, &temp_dir, 3)).unwrap();
    match run_until_interrupted(&fetcher).await.unwrap() {
        RunEnd::Completed(summary) => {
            assert_eq!(summary.processed, 6);
            assert_eq!(summary.iterations_completed, 3);
            assert!(summary.mean_per_record().is_some());
        }
        RunEnd::Interrupted(_) => panic!("no signal was sent"),
    }
}

#[tokio::test]
async fn shutdown_mid_run_keeps_finished_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let server = serve_batch(json!([full_record(31, 0), full_record(32, 0)])).await;

    let config = setu_fetch::Config {
        iteration_delay: Duration::from_secs(1),
        ..fast_config(&server, &temp_dir, 5)
    };
    let fetcher = SetuFetcher::new(config).unwrap();

    // fires while the loop sleeps after its first iteration
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = tx.send(());
    });
    let shutdown = async {
        let _ = rx.await;
    };

    match run_until(&fetcher, shutdown).await.unwrap() {
        RunEnd::Interrupted(summary) => {
            assert!(summary.processed > 0);
            assert_eq!(summary.processed, 2);
            assert!(summary.iterations_completed < 5);
            assert!(summary.mean_per_record().is_some());
        }
        RunEnd::Completed(_) => panic!("run should have been stopped early"),
    }

    let files = artifact_files(&temp_dir);
    assert_eq!(files, vec!["31_0.json", "32_0.json"]);
    for name in &files {
        let artifact = read_artifact(&temp_dir, name);
        assert!(artifact["url"].is_string());
    }

    // the index is only written by a completed run
    assert!(!temp_dir.path().join("index.json").exists());
}
