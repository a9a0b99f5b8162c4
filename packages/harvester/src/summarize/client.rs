//! Blocking client for the hosted text-generation API.
//!
//! Requests are retried on rate limits, server errors and empty responses.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::SummarizerConfig;
use super::summary_prompt;
use crate::error::{HarvesterError, Result};
use crate::types::RawSection;

/// Produces a one-sentence description of a section.
///
/// Implementations are called from several worker threads at once.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, section: &RawSection) -> Result<String>;
}

/// Summarizer backed by the Anthropic messages API.
///
/// NOTE: Do NOT derive `Debug` on this struct, `api_key` would be exposed.
pub struct LlmSummarizer {
    http: Client,
    api_key: String,
    api_base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl LlmSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Send a prompt and return the trimmed completion text.
    pub fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.api_base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let base_delays = [
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
        ];
        let max_attempts = base_delays.len() + 1;

        let mut last_error: Option<HarvesterError> = None;
        let mut next_delay = Duration::ZERO;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                debug!(attempt, "retrying summary request after {:?}", next_delay);
                thread::sleep(next_delay);
            }

            next_delay = base_delays
                .get(attempt)
                .copied()
                .unwrap_or(base_delays[base_delays.len() - 1]);

            let resp = self
                .http
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&body)
                .send();

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    warn!(attempt, error = %e, "summary request failed");
                    last_error = Some(HarvesterError::Http(e));
                    continue;
                }
            };

            let status = resp.status().as_u16();

            if status == 429 {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(attempt, retry_after, "summary request rate limited");
                next_delay = Duration::from_secs(retry_after).max(next_delay);
                last_error = Some(HarvesterError::LlmRateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status >= 500 {
                let body_text = resp.text().unwrap_or_default();
                warn!(attempt, status, body = %body_text, "summary server error");
                last_error = Some(HarvesterError::LlmApiError {
                    status,
                    message: body_text,
                });
                continue;
            }

            if status != 200 {
                let body_text = resp.text().unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&body_text)
                    .ok()
                    .and_then(|r| r.error)
                    .map(|e| e.message)
                    .unwrap_or(body_text);
                return Err(HarvesterError::LlmApiError { status, message });
            }

            let api_response: MessagesResponse = resp
                .json()
                .map_err(|e| HarvesterError::LlmResponseParse(e.to_string()))?;

            let content = api_response
                .content
                .into_iter()
                .filter_map(|block| block.text)
                .collect::<Vec<_>>()
                .join("");
            let content = content.trim();

            if content.is_empty() {
                warn!(attempt, "summary response was empty");
                last_error = Some(HarvesterError::LlmEmptyResponse);
                continue;
            }

            return Ok(content.to_string());
        }

        Err(last_error.unwrap_or(HarvesterError::LlmEmptyResponse))
    }
}

impl Summarizer for LlmSummarizer {
    fn summarize(&self, section: &RawSection) -> Result<String> {
        let prompt = summary_prompt(section)?;
        let summary = self.complete(&prompt)?;
        debug!(section = %section.id, "received section summary");
        Ok(summary)
    }
}

/// Test utilities for summarizers.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// Summarizer returning canned descriptions per section id.
    ///
    /// Sections without a canned description fail with `LlmEmptyResponse`.
    #[derive(Debug, Default)]
    pub struct MockSummarizer {
        summaries: HashMap<String, String>,
    }

    impl MockSummarizer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_summary(mut self, section_id: &str, summary: &str) -> Self {
            self.summaries
                .insert(section_id.to_string(), summary.to_string());
            self
        }
    }

    impl Summarizer for MockSummarizer {
        fn summarize(&self, section: &RawSection) -> Result<String> {
            self.summaries
                .get(&section.id)
                .cloned()
                .ok_or(HarvesterError::LlmEmptyResponse)
        }
    }
}
