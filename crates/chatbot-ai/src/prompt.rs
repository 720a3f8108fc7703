//! System prompt assembly.

use chatbot_config::schema::{PromptConfig, LANGUAGE_SLOT};

use crate::Message;

/// System instruction template with a single `{language}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    default_language: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl From<&PromptConfig> for PromptTemplate {
    fn from(config: &PromptConfig) -> Self {
        Self::new(&config.system_template, &config.default_language)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, default_language: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            default_language: default_language.into(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// The language to use: `language` unless missing or blank.
    pub fn resolve_language<'a>(&'a self, language: Option<&'a str>) -> &'a str {
        language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&self.default_language)
    }

    /// Substitute the language into the template.
    pub fn render(&self, language: Option<&str>) -> String {
        self.template
            .replace(LANGUAGE_SLOT, self.resolve_language(language))
    }

    /// Build the prompt: rendered system instruction followed by the window.
    pub fn assemble(&self, language: Option<&str>, window: &[Message]) -> Vec<Message> {
        std::iter::once(Message::system(self.render(language)))
            .chain(window.iter().cloned())
            .collect()
    }
}
