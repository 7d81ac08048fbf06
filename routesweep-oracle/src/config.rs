use std::time::Duration;

/// Configuration for the oracle client (spec §4.B, §5).
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Base URL of the external routing oracle. `None` runs the client in
    /// offline mode: every call falls back to the synthetic straight line.
    pub base_url: Option<reqwest::Url>,
    /// Maximum retry attempts for a transient failure, not counting the
    /// initial attempt.
    pub max_retries: u32,
    /// Per-call timeout.
    pub call_timeout: Duration,
    /// Base delay for exponential backoff between retries.
    pub backoff_base: Duration,
    /// Token-bucket refill rate, requests per second, per routing profile.
    pub requests_per_second_per_profile: u32,
    /// Whether responses are cached (spec §4.B: cache is optional).
    pub cache_enabled: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_retries: 3,
            call_timeout: Duration::from_secs(20),
            backoff_base: Duration::from_millis(200),
            requests_per_second_per_profile: 5,
            cache_enabled: true,
        }
    }
}
