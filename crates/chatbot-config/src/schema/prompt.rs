//! System instruction settings.

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the conversation language.
pub const LANGUAGE_SLOT: &str = "{language}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Must contain `{language}` exactly where the language name goes.
    pub system_template: String,
    pub default_language: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_template: "You are a helpful assistant. Answer all questions to the best of \
                              your ability in {language}."
                .into(),
            default_language: "English".into(),
        }
    }
}
