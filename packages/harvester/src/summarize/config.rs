use crate::error::{HarvesterError, Result};

const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Configuration for the summarization client.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub model: String,
    pub api_key: String,
    pub temperature: f64,
    pub api_base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl SummarizerConfig {
    /// Load configuration from environment variables.
    ///
    /// `LLM_API_KEY` is required; `LLM_MODEL`, `LLM_TEMPERATURE`,
    /// `LLM_API_BASE_URL`, `LLM_MAX_TOKENS` and `LLM_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| HarvesterError::Config("LLM_API_KEY not set".into()))?;

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.1);

        let api_base_url =
            std::env::var("LLM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());

        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            model,
            api_key,
            temperature,
            api_base_url,
            max_tokens,
            timeout_secs,
        })
    }

    /// Create a config builder.
    pub fn builder(api_key: impl Into<String>) -> SummarizerConfigBuilder {
        SummarizerConfigBuilder {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.1,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            max_tokens: 100,
            timeout_secs: 60,
        }
    }
}

/// Builder for constructing `SummarizerConfig`.
pub struct SummarizerConfigBuilder {
    api_key: String,
    model: String,
    temperature: f64,
    api_base_url: String,
    max_tokens: u32,
    timeout_secs: u64,
}

impl SummarizerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> SummarizerConfig {
        SummarizerConfig {
            model: self.model,
            api_key: self.api_key,
            temperature: self.temperature,
            api_base_url: self.api_base_url,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SummarizerConfig::builder("key").build();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.max_tokens, 100);
        assert!((config.temperature - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.api_base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_builder_overrides() {
        let config = SummarizerConfig::builder("key")
            .model("other-model")
            .api_base_url("http://localhost:9000")
            .max_tokens(50)
            .timeout_secs(5)
            .temperature(0.0)
            .build();
        assert_eq!(config.model, "other-model");
        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.max_tokens, 50);
        assert_eq!(config.timeout_secs, 5);
    }
}
