//! setu-fetch binary: runs one fixed fetch loop with the default configuration.
//!
//! Exit status is 0 when the loop finishes or is interrupted, 1 on any fatal error.

use setu_fetch::{Config, RunEnd, SetuFetcher, run_until_interrupted};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        at = %chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        "Initializing application"
    );
    tracing::info!("Application starting");

    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    tracing::info!(user = %user, "Current user");

    let fetcher = match SetuFetcher::new(Config::default()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            report_fatal(&e);
            return ExitCode::FAILURE;
        }
    };

    match run_until_interrupted(&fetcher).await {
        Ok(RunEnd::Completed(_)) => {
            tracing::info!("Application completed successfully");
            ExitCode::SUCCESS
        }
        Ok(RunEnd::Interrupted(summary)) => {
            tracing::warn!("Application terminated by user");
            summary.log();
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

// ERROR events go to stderr, everything else to stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::ERROR)
                .or_else(std::io::stdout),
        )
        .with_target(true)
        .with_line_number(true)
        .init();
}

fn report_fatal(error: &setu_fetch::Error) {
    let mut chain = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    tracing::error!(error = %chain, details = ?error, "Application failed with an error");
}
