use std::path::PathBuf;

use clap::Parser;

/// Chat with Gemini from the terminal.
#[derive(Parser, Debug)]
#[command(name = "chatbot", version, about)]
pub struct Args {
    /// Conversation thread to join; a fresh one is started if omitted.
    #[arg(short, long)]
    pub thread: Option<String>,

    /// Reply language for this session.
    #[arg(short, long)]
    pub language: Option<String>,

    /// Config file path override.
    #[arg(long, env = "CHATBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error). Logs go to stderr.
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
