use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

use crate::helpers::parse_token_list;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 1048576 = 1MB)
    pub request_body_limit: usize,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,

    /// Server port
    /// Env: PORT (default: 8080)
    pub port: u16,

    /// SHA-256 digests of the bearer tokens accepted on /ingest
    /// Env: INGEST_TOKENS (comma-separated plain tokens, default: none)
    pub ingest_token_hashes: Vec<String>,

    /// Pending updates queued per live subscriber before further ones are dropped
    /// Env: SUBSCRIBER_BUFFER (default: 8)
    pub subscriber_buffer: usize,

    /// Max time a single websocket write may take before the client is dropped
    /// Env: WS_SEND_TIMEOUT_SECS (default: 5)
    pub ws_send_timeout: Duration,

    /// Sustained rate for /ingest per client IP, in requests per second
    /// Env: RATE_LIMIT_INGEST_PER_SEC (default: 50)
    pub rate_limit_ingest_per_sec: u64,

    /// Burst size for /ingest
    /// Env: RATE_LIMIT_INGEST_BURST (default: 100)
    pub rate_limit_ingest_burst: u32,

    /// Sustained rate for query and websocket endpoints per client IP, in requests per second
    /// Env: RATE_LIMIT_GENERAL_PER_SEC (default: 10)
    pub rate_limit_general_per_sec: u64,

    /// Burst size for query and websocket endpoints
    /// Env: RATE_LIMIT_GENERAL_BURST (default: 20)
    pub rate_limit_general_burst: u32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for debugging mostly
        let defaults = Self::default();
        Self {
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", defaults.request_body_limit),
            request_timeout: Duration::from_secs(env_or_default(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            port: env_or_default("PORT", defaults.port),
            ingest_token_hashes: parse_token_list(&var("INGEST_TOKENS").unwrap_or_default()),
            subscriber_buffer: env_or_default("SUBSCRIBER_BUFFER", defaults.subscriber_buffer),
            ws_send_timeout: Duration::from_secs(env_or_default(
                "WS_SEND_TIMEOUT_SECS",
                defaults.ws_send_timeout.as_secs(),
            )),
            rate_limit_ingest_per_sec: env_or_default(
                "RATE_LIMIT_INGEST_PER_SEC",
                defaults.rate_limit_ingest_per_sec,
            ),
            rate_limit_ingest_burst: env_or_default(
                "RATE_LIMIT_INGEST_BURST",
                defaults.rate_limit_ingest_burst,
            ),
            rate_limit_general_per_sec: env_or_default(
                "RATE_LIMIT_GENERAL_PER_SEC",
                defaults.rate_limit_general_per_sec,
            ),
            rate_limit_general_burst: env_or_default(
                "RATE_LIMIT_GENERAL_BURST",
                defaults.rate_limit_general_burst,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_body_limit: 1024 * 1024, // 1 MB
            request_timeout: Duration::from_secs(30),
            port: 8080,
            ingest_token_hashes: Vec::new(),
            subscriber_buffer: paltrack_store::DEFAULT_SUBSCRIBER_BUFFER,
            ws_send_timeout: Duration::from_secs(5),
            rate_limit_ingest_per_sec: 50,
            rate_limit_ingest_burst: 100,
            rate_limit_general_per_sec: 10,
            rate_limit_general_burst: 20,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}
