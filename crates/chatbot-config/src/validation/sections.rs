//! Per-section validation: server, model, prompt, window, and store.

use crate::schema::{ChatbotConfig, LANGUAGE_SLOT};

use super::helpers::{validate_non_empty, validate_range, validate_range_f64};

/// Validate server constraints.
pub(crate) fn validate_server(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_non_empty(errors, "server.host", &config.server.host);
    validate_range(errors, "server.port", u32::from(config.server.port), 1, 65535);
    validate_range(errors, "server.workers", config.server.workers, 0, 256);
}

/// Validate model constraints.
pub(crate) fn validate_model(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_non_empty(errors, "model.name", &config.model.name);
    if !config.model.api_base.starts_with("http://") && !config.model.api_base.starts_with("https://")
    {
        errors.push(format!(
            "model.api_base = {:?} must be an http(s) URL",
            config.model.api_base
        ));
    }
    validate_range(
        errors,
        "model.max_output_tokens",
        config.model.max_output_tokens,
        1,
        65536,
    );
    validate_range_f64(errors, "model.temperature", config.model.temperature, 0.0, 2.0);
    validate_range(
        errors,
        "model.connect_timeout_secs",
        config.model.connect_timeout_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "model.request_timeout_secs",
        config.model.request_timeout_secs,
        1,
        600,
    );
}

/// Validate the system instruction template.
pub(crate) fn validate_prompt(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_non_empty(errors, "prompt.default_language", &config.prompt.default_language);
    if !config.prompt.system_template.contains(LANGUAGE_SLOT) {
        errors.push(format!(
            "prompt.system_template must contain the {LANGUAGE_SLOT} placeholder"
        ));
    }
}

/// Validate window (trimming) constraints.
pub(crate) fn validate_window(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_range(
        errors,
        "window.max_tokens",
        config.window.max_tokens,
        1,
        1_000_000,
    );
    validate_range(
        errors,
        "window.chars_per_token",
        config.window.chars_per_token,
        1,
        16,
    );
    validate_range(
        errors,
        "window.message_overhead",
        config.window.message_overhead,
        0,
        64,
    );
}

/// Validate store constraints.
pub(crate) fn validate_store(errors: &mut Vec<String>, config: &ChatbotConfig) {
    validate_range(
        errors,
        "store.max_threads",
        config.store.max_threads,
        1,
        1_000_000,
    );
}
