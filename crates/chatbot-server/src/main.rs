//! chatbot-server: HTTP API over the conversation engine.

use std::path::PathBuf;
use std::sync::Arc;

use chatbot_ai::{ChatEngine, GeminiClient, GeminiConfig};
use chatbot_common::ChatbotError;
use chatbot_config::ChatbotConfig;
use chatbot_server::{run_server, AppState};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatbot-server", version, about = "HTTP API for the Gemini chatbot")]
struct Args {
    /// Config file (defaults to the platform config directory).
    #[arg(short, long, env = "CHATBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter, e.g. `info` or `chatbot_ai=debug`. `RUST_LOG` wins.
    #[arg(long)]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<(), ChatbotError> {
    let dotenv = chatbot_common::load_dotenv();
    let args = Args::parse();

    let (mut config, load_error) = match chatbot_config::load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => (ChatbotConfig::default(), Some(e)),
    };

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_directive().to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "failed to load config, using defaults");
    }

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let gemini = GeminiConfig::from_env()?.with_model_config(&config.model);
    let client = GeminiClient::new(gemini)?;
    let engine = ChatEngine::from_config(Arc::new(client), &config);

    tracing::info!(
        model = engine.model_name(),
        budget = config.window.max_tokens,
        max_threads = config.store.max_threads,
        "conversation engine ready"
    );

    run_server(&config.server, AppState::new(engine)).await?;
    Ok(())
}
