//! HTTP error classification for oracle requests

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification of HTTP errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// Client errors (4xx) - should not retry
    ClientError,
    /// Server errors (5xx) - should retry
    ServerError,
    /// Connection failures and transport timeouts - should retry
    NetworkError,
    /// Rate limiting - should retry with backoff
    RateLimitError,
    /// Rejected credentials - should not retry
    AuthenticationError,
    /// Body could not be decoded - should not retry
    InvalidResponse,
    Unknown,
}

impl ErrorClassification {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorClassification::ServerError
                | ErrorClassification::NetworkError
                | ErrorClassification::RateLimitError
        )
    }

    /// Suggested wait before the next attempt, in milliseconds
    pub fn retry_delay_hint_ms(&self) -> Option<u64> {
        match self {
            ErrorClassification::RateLimitError => Some(20_000),
            ErrorClassification::ServerError => Some(2_000),
            ErrorClassification::NetworkError => Some(1_000),
            _ => None,
        }
    }
}

/// Normalized failure of one oracle HTTP exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    pub status_code: Option<u16>,
    pub classification: ErrorClassification,
    /// `error.code` from an OpenAI-style error body
    pub provider_code: Option<String>,
    pub message: String,
    pub details: Option<Value>,
    /// Retry-After header, in seconds
    pub retry_after: Option<u64>,
}

impl HttpError {
    /// Build from a non-success response, consuming its body
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<Value>(&body).ok();
        let (provider_code, message) = Self::extract_error(details.as_ref(), &body);

        Self {
            status_code: Some(status.as_u16()),
            classification: Self::classify_status(status),
            provider_code,
            message,
            details,
            retry_after,
        }
    }

    pub fn from_request_error(error: reqwest::Error) -> Self {
        let classification = if error.is_timeout() || error.is_connect() {
            ErrorClassification::NetworkError
        } else if error.is_decode() {
            ErrorClassification::InvalidResponse
        } else {
            ErrorClassification::Unknown
        };

        Self {
            status_code: error.status().map(|s| s.as_u16()),
            classification,
            provider_code: None,
            message: error.to_string(),
            details: None,
            retry_after: None,
        }
    }

    /// A well-formed response that carries no usable answer
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            classification: ErrorClassification::InvalidResponse,
            provider_code: None,
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }

    fn classify_status(status: StatusCode) -> ErrorClassification {
        match status.as_u16() {
            401 | 403 => ErrorClassification::AuthenticationError,
            429 => ErrorClassification::RateLimitError,
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }

    /// Pull `error.code` / `error.message` out of an OpenAI-style body
    fn extract_error(details: Option<&Value>, body: &str) -> (Option<String>, String) {
        let Some(json) = details else {
            return (None, body.to_string());
        };

        if let Some(error) = json.get("error") {
            let code = error
                .get("code")
                .and_then(|c| c.as_str())
                .map(str::to_string);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(body)
                .to_string();
            return (code, message);
        }

        match json.get("message").and_then(|m| m.as_str()) {
            Some(message) => (None, message.to_string()),
            None => (None, body.to_string()),
        }
    }

    pub fn should_retry(&self) -> bool {
        self.classification.is_retryable()
    }

    /// Delay before retrying: Retry-After wins over the classification hint
    pub fn retry_delay_ms(&self) -> Option<u64> {
        self.retry_after
            .map(|secs| secs.saturating_mul(1_000))
            .or_else(|| self.classification.retry_delay_hint_ms())
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Error [{}]: {} (classification: {:?})",
            self.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.message,
            self.classification
        )
    }
}

impl std::error::Error for HttpError {}

impl From<HttpError> for crate::Error {
    fn from(http_error: HttpError) -> Self {
        crate::Error::Oracle {
            message: http_error.message.clone(),
            status_code: http_error.status_code,
            source: Some(anyhow::Error::new(http_error)),
        }
    }
}
