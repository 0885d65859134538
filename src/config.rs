//! Configuration types for setu-fetch
//!
//! The binary always runs with [`Config::default()`]; nothing is read from files or flags.
//! The fields stay public so the fetch loop can be pointed at a local server and run with
//! short delays in tests.

use serde::Serialize;
use std::{path::PathBuf, time::Duration};

/// Remote endpoint queried on every attempt
pub const DEFAULT_API_URL: &str = "https://api.lolicon.app/setu/v2";

/// Number of outer iterations in one run
pub const ITERATIONS: u32 = 51;

/// Attempts per iteration before moving on
pub const MAX_ATTEMPTS: u32 = 3;

/// Wait between attempts after a connection or API failure
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

/// Wait between iterations (skipped after the last one)
pub const ITERATION_DELAY: Duration = Duration::from_secs(5);

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per call (`num`)
pub const BATCH_SIZE: u32 = 20;

/// Image size variant requested (`size`)
pub const IMAGE_SIZE: &str = "regular";

/// Adult-content flag sent with every request (`r18`)
pub const R18: u8 = 1;

/// Host prefix stripped from `urls.regular` to build the relative `url` field
pub const IMAGE_HOST_PREFIX: &str = "https://i.pixiv.re";

/// Directory receiving one JSON file per record
pub const DEFAULT_OUTPUT_DIR: &str = "./data";

/// Manifest listing the artifact file names, read by the static viewer
pub const DEFAULT_INDEX_PATH: &str = "./index.json";

/// Idle keep-alive connections kept per host
pub const POOL_MAX_IDLE_PER_HOST: usize = 5;

/// Query string sent with each request, serialized by `reqwest` into `?r18=..&num=..&size=..`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    /// Adult-content flag (default: 1)
    pub r18: u8,

    /// Records per response (default: 20)
    pub num: u32,

    /// Image size variant (default: "regular")
    pub size: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            r18: R18,
            num: BATCH_SIZE,
            size: IMAGE_SIZE.to_string(),
        }
    }
}

/// Retry behavior within a single iteration
///
/// The delay is fixed: there is no backoff and no jitter.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Attempts per iteration, including the first (default: 3)
    pub max_attempts: u32,

    /// Delay before the next attempt after a retryable failure (default: 10 seconds)
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// Top-level configuration for a fetch run
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// API endpoint (default: the public lolicon v2 endpoint)
    pub api_url: String,

    /// Query parameters
    pub query: QueryParams,

    /// Number of iterations (default: 51)
    pub iterations: u32,

    /// Delay between iterations (default: 5 seconds)
    pub iteration_delay: Duration,

    /// Per-request timeout (default: 30 seconds)
    pub request_timeout: Duration,

    /// Retry behavior
    pub retry: RetryConfig,

    /// Prefix removed from `urls.regular` when deriving `url`
    pub host_prefix: String,

    /// Output directory for artifacts (default: "./data")
    pub output_dir: PathBuf,

    /// Where to write the artifact manifest (None = don't write one)
    pub index_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            query: QueryParams::default(),
            iterations: ITERATIONS,
            iteration_delay: ITERATION_DELAY,
            request_timeout: REQUEST_TIMEOUT,
            retry: RetryConfig::default(),
            host_prefix: IMAGE_HOST_PREFIX.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            index_path: Some(PathBuf::from(DEFAULT_INDEX_PATH)),
        }
    }
}

impl Config {
    /// Check the values a run cannot work without
    pub fn validate(&self) -> crate::Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(crate::Error::Config {
                message: "at least one attempt per iteration is required".to_string(),
                key: Some("retry.max_attempts".to_string()),
            });
        }
        if self.api_url.is_empty() {
            return Err(crate::Error::Config {
                message: "API URL must not be empty".to_string(),
                key: Some("api_url".to_string()),
            });
        }
        Ok(())
    }
}
