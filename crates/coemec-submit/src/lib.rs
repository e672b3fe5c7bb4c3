//! Delivery of assembled survey payloads to the backend.

pub mod client;
pub mod error;
mod retry;

use std::future::Future;

use coemec_core::{AppConfig, SubmissionPayload};
use uuid::Uuid;

pub use client::HttpSubmitter;
pub use error::SubmitError;

/// Outcome of one form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    /// Sent as `x-request-id`; identical across retries of one submission.
    pub submission_id: Uuid,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// The backend accepted the payload.
    Sent {
        status: u16,
        body: Option<serde_json::Value>,
    },
    /// No backend configured; the payload was written to the log only.
    LoggedOnly,
}

/// Something that accepts a finished payload. Called once per submission.
pub trait Submitter {
    fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<SubmissionReceipt, SubmitError>> + Send;
}

/// Writes the payload to the log and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSubmitter;

impl Submitter for LogSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        let submission_id = Uuid::new_v4();
        match serde_json::to_string(payload) {
            Ok(json) => tracing::info!(%submission_id, payload = %json, "payload ready to send"),
            Err(e) => tracing::warn!(%submission_id, error = %e, "payload could not be rendered"),
        }
        Ok(SubmissionReceipt {
            submission_id,
            delivery: Delivery::LoggedOnly,
        })
    }
}

/// The submitter selected by configuration: HTTP when `COEMEC_SUBMIT_URL`
/// is set, log-only otherwise.
pub enum ConfiguredSubmitter {
    Http(HttpSubmitter),
    Log(LogSubmitter),
}

impl ConfiguredSubmitter {
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the configured URL is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SubmitError> {
        match config.submit_url.as_deref() {
            Some(url) => Ok(Self::Http(HttpSubmitter::from_config(url, config)?)),
            None => {
                tracing::info!("no submission URL configured; payloads will only be logged");
                Ok(Self::Log(LogSubmitter))
            }
        }
    }
}

impl Submitter for ConfiguredSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        match self {
            Self::Http(s) => s.submit(payload).await,
            Self::Log(s) => s.submit(payload).await,
        }
    }
}
