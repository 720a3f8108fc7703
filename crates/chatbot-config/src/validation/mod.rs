//! Full configuration validation.
//!
//! Validates numeric ranges and the prompt template. Each section has its
//! own check; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::ChatbotConfig;
use chatbot_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ChatbotConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_server(&mut errors, config);
    sections::validate_model(&mut errors, config);
    sections::validate_prompt(&mut errors, config);
    sections::validate_window(&mut errors, config);
    sections::validate_store(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
