//! HTTP delivery of submission payloads.
//!
//! Posts the payload as JSON to `{base}/api/evento-adverso`. Every
//! submission gets a fresh `x-request-id`, reused across its retries so the
//! backend can spot duplicates.

use std::time::Duration;

use coemec_core::{AppConfig, SubmissionPayload};
use reqwest::{Client, StatusCode, Url};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::retry::retry_with_backoff;
use crate::{Delivery, SubmissionReceipt, Submitter};

const SUBMIT_PATH: &str = "api/evento-adverso";
const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct HttpSubmitter {
    client: Client,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpSubmitter {
    /// Creates a submitter posting to `base_url` with default retry settings
    /// (3 retries, 1 s base back-off).
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SubmitError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so joining keeps any path prefix.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| SubmitError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let endpoint = base.join(SUBMIT_PATH).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// # Errors
    ///
    /// See [`HttpSubmitter::new`].
    pub fn from_config(base_url: &str, config: &AppConfig) -> Result<Self, SubmitError> {
        Ok(
            Self::new(base_url, config.submit_timeout_secs, &config.submit_user_agent)?
                .with_retry(config.submit_max_retries, config.submit_retry_backoff_ms),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_once(
        &self,
        submission_id: Uuid,
        payload: &SubmissionPayload,
    ) -> Result<Delivery, SubmitError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(REQUEST_ID_HEADER, submission_id.to_string())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(Delivery::Sent {
                status: status.as_u16(),
                body: parse_body(&body),
            });
        }
        Err(classify_failure(status, body))
    }
}

fn parse_body(body: &str) -> Option<serde_json::Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string())))
}

fn classify_failure(status: StatusCode, body: String) -> SubmitError {
    if status.is_server_error() {
        SubmitError::Server {
            status: status.as_u16(),
            body,
        }
    } else {
        SubmitError::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        let submission_id = Uuid::new_v4();
        tracing::info!(
            %submission_id,
            endpoint = %self.endpoint,
            fields = payload.fields.len(),
            has_location = payload.location.is_some(),
            "submitting adverse event report"
        );

        let delivery = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_once(submission_id, payload)
        })
        .await
        .inspect_err(|e| tracing::error!(%submission_id, error = %e, "submission failed"))?;

        Ok(SubmissionReceipt {
            submission_id,
            delivery,
        })
    }
}
