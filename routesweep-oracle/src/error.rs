use thiserror::Error;

/// Internal-only error type for a single oracle call attempt.
///
/// This never escapes [`crate::OracleClient::route`]: callers always get a
/// usable geometry, synthetic if need be (spec §4.B). It exists purely to
/// decide whether an attempt is worth retrying.
#[derive(Debug, Error)]
pub(crate) enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oracle returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("call timed out")]
    Timeout,
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

impl OracleError {
    /// Transient failures (timeout, 5xx, 429) are retried; anything else
    /// (4xx other than 429, malformed body) is not worth retrying.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            OracleError::Timeout => true,
            OracleError::Status(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            OracleError::Transport(e) => e.is_timeout() || e.is_connect(),
            OracleError::Malformed(_) => false,
        }
    }
}
