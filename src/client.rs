// ABOUTME: Remote upload client submitting workout payloads to the backend
// ABOUTME: reqwest implementation with configured timeouts and diagnostic body capture
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

use crate::constants::transport::{MAX_DIAGNOSTIC_BODY_LEN, WORKOUTS_PATH};
use crate::errors::{AppError, AppResult, FailureCategory, TransportFailure};
use crate::models::WorkoutUploadPayload;

/// Submits assembled workouts to the remote service
///
/// Implementations report every non-2xx response as a failure; retry scheduling across
/// time belongs to the caller.
#[async_trait::async_trait]
pub trait UploadClient: Send + Sync {
    /// Submit one workout
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] if the service did not confirm the upload
    async fn submit(&self, payload: &WorkoutUploadPayload) -> Result<(), TransportFailure>;
}

/// HTTP upload client posting JSON to `{base_url}/workouts`
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpUploadClient {
    /// Build a client with request and connect timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> AppResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| AppError::config("failed to build HTTP client").with_source(e))?;
        Ok(Self::with_client(client, base_url, api_token))
    }

    /// Use an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: &str, api_token: Option<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}{WORKOUTS_PATH}", base_url.trim_end_matches('/')),
            api_token,
        }
    }

    /// Full upload endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl UploadClient for HttpUploadClient {
    async fn submit(&self, payload: &WorkoutUploadPayload) -> Result<(), TransportFailure> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            debug!(workout_id = %payload.id, status = status.as_u16(), "Workout upload accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportFailure::http_status(
            status.as_u16(),
            truncate_body(&body),
        ))
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportFailure {
    let category = if error.is_timeout() {
        FailureCategory::Timeout
    } else if error.is_builder() || error.is_body() {
        FailureCategory::Encoding
    } else {
        FailureCategory::Network
    };
    TransportFailure::without_response(category, error.to_string())
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_DIAGNOSTIC_BODY_LEN {
        return body.to_owned();
    }
    let mut end = MAX_DIAGNOSTIC_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpUploadClient::with_client(
            Client::new(),
            "https://pierre.example.com/api/",
            None,
        );
        assert_eq!(client.endpoint(), "https://pierre.example.com/api/workouts");
    }

    #[test]
    fn test_long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_DIAGNOSTIC_BODY_LEN);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_DIAGNOSTIC_BODY_LEN + 3);
        assert_eq!(truncate_body("short"), "short");
    }
}
