//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Chatbot Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 8000
# workers = 0            # 0 = one per core

[model]
# name = "gemini-2.5-flash"
# api_base = "https://generativelanguage.googleapis.com/v1beta/models"
# max_output_tokens = 4096   # 1-65536
# temperature = 0.7          # 0.0-2.0
# connect_timeout_secs = 10  # 1-60
# request_timeout_secs = 120 # 1-600
# The API key is read from GEMINI_API_KEY (or GOOGLE_API_KEY).

[prompt]
# system_template = "You are a helpful assistant. Answer all questions to the best of your ability in {language}."
# default_language = "English"

[window]
# max_tokens = 65          # token budget for history sent to the model
# include_system = true   # no effect on the server: stored history never holds the system prompt
# allow_partial = false
# start_on = "user"        # user, assistant, any
# chars_per_token = 4      # 1-16
# message_overhead = 3     # 0-64

[store]
# max_threads = 1000       # least recently used conversation is evicted past this

[logging]
# level = "INFO"           # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
