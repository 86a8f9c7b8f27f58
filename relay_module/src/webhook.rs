//! Outbound HTTP delivery to the automation webhooks.
//!
//! Every call is best-effort: the caller gets a `Result` to log and nothing is
//! retried or queued.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

/// Longest response body excerpt kept on a failed delivery.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("http error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Transport(err)
        }
    }
}

/// JSON-over-HTTP client shared by all event handlers.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// POST `body` as JSON and return the status on 2xx.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<StatusCode, DeliveryError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }
}

/// Turn a non-2xx response into [`DeliveryError::Status`] with a short body excerpt.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<StatusCode, DeliveryError> {
    let status = response.status();
    if status.is_success() {
        debug!("webhook responded {}", status);
        return Ok(status);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Status {
        status,
        body: excerpt(&body),
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut short: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    short.push('…');
    short
}
