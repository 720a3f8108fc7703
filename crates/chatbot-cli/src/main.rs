//! chatbot: interactive terminal chat over the conversation engine.

mod cli;
mod repl;

use std::sync::Arc;

use chatbot_ai::{ChatEngine, GeminiClient, GeminiConfig};
use chatbot_common::{new_id, ChatbotError};
use chatbot_config::ChatbotConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ChatbotError> {
    chatbot_common::load_dotenv();
    let args = cli::parse();

    // Chat output owns stdout; keep logs quiet and on stderr.
    let log_directive = args.log_level.as_deref().unwrap_or("warn");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directive)),
        )
        .init();

    let config = match chatbot_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            ChatbotConfig::default()
        }
    };

    let gemini = GeminiConfig::from_env()?.with_model_config(&config.model);
    let engine = ChatEngine::from_config(Arc::new(GeminiClient::new(gemini)?), &config);

    let thread_id = args.thread.unwrap_or_else(new_id);
    println!(
        "Chatting with {} on thread {thread_id}. Type /help for commands.",
        engine.model_name()
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    repl::run_session(&engine, &thread_id, args.language, stdin, &mut stdout).await?;
    Ok(())
}
