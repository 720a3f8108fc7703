//! Line-oriented chat loop.

use std::io::{self, Write};

use chatbot_ai::{ChatEngine, Message, Role};
use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
Commands:
  /history           show this session's transcript
  /clear             forget the conversation
  /language [name]   show or set the reply language
  /help              show this help
  /quit              exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Send(&'a str),
    History,
    Clear,
    Language(Option<&'a str>),
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    match name {
        "history" => Command::History,
        "clear" => Command::Clear,
        "language" | "lang" => Command::Language(arg),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

/// Run the chat loop until `/quit` or end of input.
///
/// Reply fragments are written as they arrive. Returns the session's local
/// transcript (completed exchanges plus unanswered user turns).
pub async fn run_session<R, W>(
    engine: &ChatEngine,
    thread_id: &str,
    mut language: Option<String>,
    input: R,
    out: &mut W,
) -> io::Result<Vec<Message>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut transcript = Vec::new();
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Unknown(name) => writeln!(out, "Unknown command /{name}. Try /help.")?,
            Command::History => {
                if transcript.is_empty() {
                    writeln!(out, "(no messages yet)")?;
                }
                for message in &transcript {
                    writeln!(out, "{}: {}", speaker(message), message.content)?;
                }
            }
            Command::Clear => {
                engine.clear(thread_id).await;
                transcript.clear();
                writeln!(out, "Conversation cleared.")?;
            }
            Command::Language(None) => {
                writeln!(out, "Language: {}", engine.language(thread_id).await)?;
            }
            Command::Language(Some(name)) => {
                engine.set_language(thread_id, name).await;
                language = Some(name.to_string());
                writeln!(out, "Language set to {name}.")?;
            }
            Command::Send(text) => {
                transcript.push(Message::user(text));
                if let Some(reply) = send(engine, thread_id, text, language.as_deref(), out).await? {
                    transcript.push(Message::assistant(reply));
                }
            }
        }
    }

    Ok(transcript)
}

/// Stream one reply to `out`. Model errors are reported inline and yield
/// `None`; only write failures are returned as errors.
async fn send<W: Write>(
    engine: &ChatEngine,
    thread_id: &str,
    text: &str,
    language: Option<&str>,
    out: &mut W,
) -> io::Result<Option<String>> {
    let mut fragments = match engine.chat_stream(thread_id, text, language).await {
        Ok(fragments) => fragments,
        Err(err) => {
            writeln!(out, "[error] {err}")?;
            return Ok(None);
        }
    };

    write!(out, "Bot: ")?;
    let mut reply = String::new();
    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                write!(out, "{text}")?;
                out.flush()?;
                reply.push_str(&text);
            }
            Err(err) => {
                writeln!(out, "\n[error] {err}")?;
                return Ok(None);
            }
        }
    }
    writeln!(out)?;
    Ok(Some(reply))
}

fn speaker(message: &Message) -> &'static str {
    match message.role {
        Role::User => "You",
        Role::Assistant => "Bot",
        Role::System => "System",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chatbot_ai::{AiClient, AiError, ChunkStream, StreamEvent};

    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), Command::Empty);
        assert_eq!(parse_command("hello there"), Command::Send("hello there"));
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("/clear"), Command::Clear);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/language"), Command::Language(None));
        assert_eq!(
            parse_command("/language  Spanish "),
            Command::Language(Some("Spanish"))
        );
        assert_eq!(parse_command("/dance now"), Command::Unknown("dance"));
    }

    struct EchoClient {
        fail: bool,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl EchoClient {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AiClient for EchoClient {
        async fn stream_message(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(AiError::RateLimited);
            }
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(Box::pin(futures_util::stream::iter(vec![
                Ok(StreamEvent::Delta("Echo ".into())),
                Ok(StreamEvent::Delta(last)),
            ])))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    async fn run(engine: &ChatEngine, script: &str) -> (String, Vec<Message>) {
        let mut out = Vec::new();
        let transcript = run_session(engine, "cli", None, script.as_bytes(), &mut out)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), transcript)
    }

    #[tokio::test]
    async fn prints_reply_and_keeps_transcript() {
        let client = EchoClient::new(false);
        let engine = ChatEngine::new(client.clone());

        let (output, transcript) = run(&engine, "hello\n/history\n").await;
        assert!(output.contains("Bot: Echo hello\n"));
        assert!(output.contains("You: hello\nBot: Echo hello\n"));
        assert_eq!(
            transcript,
            vec![Message::user("hello"), Message::assistant("Echo hello")]
        );
        assert_eq!(engine.history("cli").await, transcript);
    }

    #[tokio::test]
    async fn language_command_changes_system_prompt() {
        let client = EchoClient::new(false);
        let engine = ChatEngine::new(client.clone());

        let (output, _) = run(&engine, "/language French\nbonjour\n/language\n").await;
        assert!(output.contains("Language set to French."));
        assert!(output.contains("Language: French"));

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0][0].content.contains("French"));
    }

    #[tokio::test]
    async fn clear_and_quit() {
        let client = EchoClient::new(false);
        let engine = ChatEngine::new(client.clone());

        let (output, transcript) = run(&engine, "one\n/clear\n/history\n/quit\ntwo\n").await;
        assert!(output.contains("Conversation cleared."));
        assert!(output.contains("(no messages yet)"));
        assert!(transcript.is_empty());
        assert!(engine.history("cli").await.is_empty());
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn model_errors_keep_the_session_alive() {
        let client = EchoClient::new(true);
        let engine = ChatEngine::new(client.clone());

        let (output, transcript) = run(&engine, "hi\n/help\n").await;
        assert!(output.contains("[error] Rate limited"));
        assert!(output.contains("Commands:"));
        assert_eq!(transcript, vec![Message::user("hi")]);
    }
}
