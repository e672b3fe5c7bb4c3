use thiserror::Error;

/// Errors returned when delivering a submission payload.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend refused the payload (4xx). Retrying will not help.
    #[error("submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The backend failed while handling the payload (5xx).
    #[error("submission backend error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("invalid submission URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
