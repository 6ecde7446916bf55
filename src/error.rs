use reqwest::StatusCode;
use thiserror::Error;

/// Any failure of a single `/generate-sql` call. The transcript shows the same
/// text for every variant; the variant only reaches the diagnostics log.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {0}")]
    Status(StatusCode),
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("tokio runtime unavailable: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
