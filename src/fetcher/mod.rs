//! The fetch loop: request a batch, persist each record, repeat.
//!
//! One [`SetuFetcher`] owns one HTTP client for its whole lifetime. Iterations run
//! strictly one after another; the only suspension points are the request itself and
//! the fixed sleeps.

mod summary;


pub use summary::RunSummary;

use crate::config::Config;
use crate::error::{Error, RecordError, Result};
use crate::record::Record;
use crate::retry::{Outcome, fetch_with_retry};
use crate::store::ArtifactStore;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Body of a successful API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Vec<Value>,
}

/// Records written and skipped by one successful attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items in the response
    pub received: usize,
    /// Artifacts written
    pub written: usize,
    /// Items skipped for missing fields
    pub skipped: usize,
}

// Kept outside `run` so an interrupted run can still report what it got through.
#[derive(Debug, Default)]
struct Progress {
    processed: AtomicU64,
    iterations_completed: AtomicU32,
    started: OnceLock<Instant>,
}

/// Polls the API a fixed number of times and writes one file per record
#[derive(Debug)]
pub struct SetuFetcher {
    config: Config,
    client: reqwest::Client,
    store: ArtifactStore,
    progress: Progress,
}

impl SetuFetcher {
    /// Validate the configuration, create the output directory and build the HTTP client
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let store = ArtifactStore::open(&config.output_dir)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(crate::config::POOL_MAX_IDLE_PER_HOST)
            .no_proxy()
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;

        tracing::debug!(
            max_attempts = config.retry.max_attempts,
            timeout_secs = config.request_timeout.as_secs_f64(),
            "HTTP client initialized"
        );

        Ok(Self {
            config,
            client,
            store,
            progress: Progress::default(),
        })
    }

    /// The configuration this fetcher runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The artifact store
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Records persisted so far
    pub fn processed(&self) -> u64 {
        self.progress.processed.load(Ordering::SeqCst)
    }

    /// Snapshot of the run so far
    ///
    /// Elapsed time is measured from the start of [`run`](Self::run), or zero if the
    /// run has not started.
    pub fn summary(&self) -> RunSummary {
        let elapsed = self
            .progress
            .started
            .get()
            .map(Instant::elapsed)
            .unwrap_or_default();

        RunSummary {
            processed: self.processed(),
            iterations_completed: self.progress.iterations_completed.load(Ordering::SeqCst),
            elapsed,
        }
    }

    /// Run every iteration, then write the index and report
    ///
    /// Request-level failures are contained in each iteration. Only fatal errors
    /// (I/O, serialization) are returned.
    pub async fn run(&self) -> Result<RunSummary> {
        self.progress.started.get_or_init(Instant::now);
        tracing::info!("Starting image fetching process");

        let total = self.config.iterations;
        for iteration in 1..=total {
            self.run_iteration(iteration, total).await?;
            self.progress
                .iterations_completed
                .fetch_add(1, Ordering::SeqCst);

            if iteration < total {
                tracing::debug!(
                    delay_secs = self.config.iteration_delay.as_secs_f64(),
                    "Sleeping before next iteration"
                );
                tokio::time::sleep(self.config.iteration_delay).await;
            }
        }

        if let Some(index_path) = &self.config.index_path {
            self.store.write_index(index_path)?;
        }

        let summary = self.summary();
        summary.log();
        Ok(summary)
    }

    async fn run_iteration(&self, iteration: u32, total: u32) -> Result<()> {
        let iteration_start = Instant::now();
        tracing::info!(iteration, total, "Starting iteration");

        let this = self;
        let outcome = fetch_with_retry(&self.config.retry, move |_attempt| {
            this.fetch_and_persist()
        })
        .await?;

        match outcome {
            Outcome::Success { value, attempts } => {
                tracing::debug!(
                    iteration,
                    attempts,
                    written = value.written,
                    skipped = value.skipped,
                    "Batch persisted"
                );
            }
            Outcome::Exhausted { attempts, .. } | Outcome::Aborted { attempts, .. } => {
                tracing::warn!(iteration, attempts, "No batch persisted in this iteration");
            }
        }

        let elapsed = format!("{:.2}s", iteration_start.elapsed().as_secs_f64());
        tracing::info!(iteration, elapsed = %elapsed, "Iteration completed");
        Ok(())
    }

    /// One attempt: request a batch and write every usable record
    pub async fn fetch_and_persist(&self) -> Result<BatchReport> {
        let items = self.fetch_batch().await?;
        self.persist_batch(items)
    }

    /// Issue one request and decode the `data` array
    pub async fn fetch_batch(&self) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&self.config.query)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        status = status.as_u16(),
                        "Could not read error response body"
                    );
                    String::new()
                }
            };
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: ApiResponse = serde_json::from_slice(&body).map_err(Error::Decode)?;
        tracing::info!(count = parsed.data.len(), "Received images in response");
        Ok(parsed.data)
    }

    /// Write each usable record; skip the rest
    ///
    /// A record missing `pid` or `urls.regular` is logged and skipped. A write failure
    /// is returned and ends the run.
    pub fn persist_batch(&self, items: Vec<Value>) -> Result<BatchReport> {
        let mut report = BatchReport {
            received: items.len(),
            ..Default::default()
        };

        for item in items {
            let record = match Record::from_value(item) {
                Ok(record) => record,
                Err(RecordError::MissingUrl { pid }) => {
                    tracing::warn!(pid = %pid, "Missing URL data for image, skipping");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid image data structure");
                    report.skipped += 1;
                    continue;
                }
            };

            tracing::debug!(pid = record.pid(), p = record.page(), "Processing image");
            let derived = record.derive(&self.config.host_prefix);
            self.store.write(&derived)?;

            report.written += 1;
            self.progress.processed.fetch_add(1, Ordering::SeqCst);
        }

        Ok(report)
    }
}
