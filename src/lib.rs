//! # setu-fetch
//!
//! Polls the lolicon setu v2 API a fixed number of times and stores every returned image
//! record as its own JSON file.
//!
//! Each run performs [`config::ITERATIONS`] iterations. An iteration makes up to
//! [`config::MAX_ATTEMPTS`] requests, stopping at the first one that succeeds, and then
//! sleeps [`config::ITERATION_DELAY`] before the next. Every usable record of a batch is
//! written to `{output_dir}/{pid}_{p}.json` with an extra relative `url` field.
//!
//! ## Quick Start
//!
//! ```no_run
//! use setu_fetch::{Config, RunEnd, SetuFetcher, run_until_interrupted};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = SetuFetcher::new(Config::default())?;
//!
//!     match run_until_interrupted(&fetcher).await? {
//!         RunEnd::Completed(summary) => println!("{}", summary.message()),
//!         RunEnd::Interrupted(summary) => println!("stopped early: {}", summary.message()),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types and fixed run constants
pub mod config;
/// Error types
pub mod error;
/// The iteration loop and HTTP access
pub mod fetcher;
/// Record validation and derivation
pub mod record;
/// Fixed-delay retry loop
pub mod retry;
/// Artifact files and the index manifest
pub mod store;

// Re-export commonly used types
pub use config::{Config, QueryParams, RetryConfig};
pub use error::{Error, RecordError, Result};
pub use fetcher::{BatchReport, RunSummary, SetuFetcher};
pub use record::{DerivedRecord, Record};
pub use store::ArtifactStore;

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEnd {
    /// Every iteration ran
    Completed(RunSummary),
    /// A termination signal arrived first
    Interrupted(RunSummary),
}

/// Run the fetcher until it finishes or `shutdown` resolves, whichever comes first.
///
/// When `shutdown` wins, the run future is dropped and the progress so far is returned as
/// [`RunEnd::Interrupted`]. Artifact writes never span an await point, so every file
/// already on disk is complete.
pub async fn run_until<F>(fetcher: &SetuFetcher, shutdown: F) -> Result<RunEnd>
where
    F: std::future::Future<Output = ()>,
{
    tokio::select! {
        result = fetcher.run() => result.map(RunEnd::Completed),
        () = shutdown => Ok(RunEnd::Interrupted(fetcher.summary())),
    }
}

/// [`run_until`] Ctrl+C, or SIGTERM on Unix.
pub async fn run_until_interrupted(fetcher: &SetuFetcher) -> Result<RunEnd> {
    run_until(fetcher, shutdown_signal()).await
}

// Resolves on the first termination request. A listener that cannot be installed never
// resolves, so it cannot end the run as if the user had stopped it.
async fn shutdown_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received interrupt (Ctrl+C)"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}
