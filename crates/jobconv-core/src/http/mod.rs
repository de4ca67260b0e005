//! HTTP plumbing for the classification oracle
//!
//! - Error classification and normalization of failed exchanges
//! - Retry logic with exponential backoff

pub mod error;
pub mod retry;

pub use error::{ErrorClassification, HttpError};
pub use retry::{execute_with_retry, RetryDecision, RetryHandler, RetryPolicy};

// Re-export commonly used types
pub use reqwest::StatusCode;
