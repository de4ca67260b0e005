//! OpenAI chat-completions oracle

use super::oracle::ClassificationOracle;
use super::prompt::SYSTEM_MESSAGE;
use crate::error::{Error, Result};
use crate::http::{execute_with_retry, HttpError, RetryPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "GPTAPI";

/// Connection settings for [`OpenAiOracle`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline key; takes precedence over the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport timeout for a single HTTP request, in seconds
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            max_tokens: 100,
            request_timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl OracleConfig {
    /// Inline key if set, else the configured environment variable.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiOracle {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl OpenAiOracle {
    /// Build from config. `Ok(None)` means no API key is available and
    /// callers should run heuristic-only.
    pub fn from_config(config: &OracleConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.resolve_api_key() else {
            info!(env = %config.api_key_env, "no oracle API key, classification is heuristic-only");
            return Ok(None);
        };
        Self::new(config, api_key).map(Some)
    }

    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self> {
        let endpoint = chat_endpoint(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Configuration {
                message: "failed to build HTTP client".to_string(),
                source: Some(e.into()),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: config.retry.clone(),
        })
    }

    async fn send(&self, prompt: &str) -> std::result::Result<String, HttpError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(HttpError::from_request_error)?;

        if !response.status().is_success() {
            return Err(HttpError::from_response(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(HttpError::from_request_error)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| HttpError::invalid_response("response contained no message content"))
    }
}

#[async_trait]
impl ClassificationOracle for OpenAiOracle {
    async fn classify(&self, prompt: &str, options: &[String]) -> Result<String> {
        debug!(model = %self.model, options = options.len(), "sending classification request");
        let answer = execute_with_retry(|| self.send(prompt), self.retry.clone()).await?;
        debug!(answer = %answer, "oracle answered");
        Ok(answer)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn chat_endpoint(base_url: &str) -> Result<Url> {
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalized)
        .and_then(|base| base.join("chat/completions"))
        .map_err(|e| Error::Configuration {
            message: format!("invalid oracle base URL '{}'", base_url),
            source: Some(e.into()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_endpoint() {
        assert_eq!(
            chat_endpoint("https://api.openai.com/v1").unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_endpoint("http://localhost:8080/v1/").unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert!(chat_endpoint("not a url").is_err());
    }

    #[test]
    fn test_inline_key_wins_and_blank_is_absent() {
        let config = OracleConfig {
            api_key_env: "JOBCONV_TEST_UNSET_KEY_VAR".to_string(),
            api_key: Some("sk-inline".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));

        let blank = OracleConfig {
            api_key_env: "JOBCONV_TEST_UNSET_KEY_VAR".to_string(),
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.resolve_api_key(), None);
    }

    #[test]
    fn test_missing_key_means_no_oracle() {
        let config = OracleConfig {
            api_key_env: "JOBCONV_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(OpenAiOracle::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: "prompt",
                },
            ],
            max_tokens: 100,
            temperature: 0.1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][1]["content"], "prompt");
        assert_eq!(json["max_tokens"], 100);
    }
}
