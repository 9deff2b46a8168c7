//! Common error type and result alias for the crate.
//!
//! Every failure mode the generation flow can hit has a variant here; the
//! node boundary converts all of them into a failure summary rather than
//! letting them escape to the caller.
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// No API key available at submission time.
    #[error("Google API key not found. Please provide a valid API key.")]
    CredentialMissing,

    /// Transport-level failure talking to the remote service.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The remote service rejected a request (non-2xx reply).
    #[error("{0}")]
    Service(String),

    /// The remote job itself reported a terminal error after polling.
    #[error("Video generation failed: {0}")]
    RemoteJob(String),

    /// Job completed but carried no artifacts.
    #[error("No video was generated in the response")]
    EmptyResult,

    /// The overall deadline elapsed before the job reported done.
    #[error("Video generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The caller cancelled the flow before completion.
    #[error("Video generation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
