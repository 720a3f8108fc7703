//! Remote model settings.

use serde::{Deserialize, Serialize};

/// Which hosted model to call and how patiently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub api_base: String,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub connect_timeout_secs: u32,
    /// Upper bound for a whole invocation, streamed body included.
    pub request_timeout_secs: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-flash".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            max_output_tokens: 4096,
            temperature: 0.7,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}
