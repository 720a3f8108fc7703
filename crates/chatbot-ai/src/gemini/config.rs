//! Gemini API client configuration.

use std::time::Duration;

use chatbot_config::schema::ModelConfig;

use crate::AiError;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Build a config from the first non-empty API key variable.
    pub fn from_env() -> Result<Self, AiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AiError> {
        API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                AiError::ApiError(format!(
                    "Gemini API not configured: set {} or {}",
                    API_KEY_VARS[0], API_KEY_VARS[1]
                ))
            })
    }

    /// Apply the `[model]` config section.
    pub fn with_model_config(self, model: &ModelConfig) -> Self {
        self.with_model(&model.name)
            .with_api_base(&model.api_base)
            .with_max_tokens(model.max_output_tokens)
            .with_temperature(model.temperature)
            .with_timeouts(
                Duration::from_secs(u64::from(model.connect_timeout_secs)),
                Duration::from_secs(u64::from(model.request_timeout_secs)),
            )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = GeminiConfig::new("secret-key");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn lookup_prefers_gemini_key() {
        let config = GeminiConfig::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("g".into()),
            "GOOGLE_API_KEY" => Some("o".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key, "g");
    }

    #[test]
    fn lookup_falls_back_to_google_key() {
        let config = GeminiConfig::from_lookup(|name| match name {
            "GEMINI_API_KEY" => Some("  ".into()),
            "GOOGLE_API_KEY" => Some("o".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key, "o");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = GeminiConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn model_config_is_applied() {
        let model = ModelConfig {
            name: "gemini-test".into(),
            api_base: "http://localhost:9000/models/".into(),
            max_output_tokens: 256,
            temperature: 0.1,
            connect_timeout_secs: 2,
            request_timeout_secs: 30,
        };
        let config = GeminiConfig::new("k").with_model_config(&model);
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.api_base, "http://localhost:9000/models");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
