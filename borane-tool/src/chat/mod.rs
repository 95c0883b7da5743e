mod input;
mod session;

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

pub use input::{UserInput, parse_input};
pub use session::ChatSession;

use crate::error::BorError;

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Sends a single prompt and prints the reply.
pub async fn run_once<W: Write>(
    session: &mut ChatSession,
    prompt: &str,
    out: &mut W,
) -> Result<(), BorError> {
    session.send_turn(prompt, out, ctrl_c()).await?;
    writeln!(out)?;
    Ok(())
}

/// Reads prompts line by line until EOF, `exit`/`quit` or an interrupt at
/// the prompt.
///
/// `interrupt` is called afresh for every wait. While a reply streams, an
/// interrupt abandons only that turn. A failed turn is reported and the
/// loop keeps going.
pub async fn run_interactive<R, W, I, F>(
    session: &mut ChatSession,
    input: R,
    out: &mut W,
    mut interrupt: I,
) -> Result<(), BorError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: FnMut() -> F,
    F: Future<Output = ()>,
{
    writeln!(out, "Starting chat with model: {}", session.model())?;
    writeln!(out, "Type 'exit' or 'quit' to end the session.")?;
    writeln!(out, "{}", "-".repeat(67))?;

    let mut lines = input.lines();
    loop {
        write!(out, "\n> You: ")?;
        out.flush()?;

        let line = tokio::select! {
            biased;
            _ = interrupt() => {
                writeln!(out)?;
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            UserInput::Quit => break,
            UserInput::Empty => continue,
            UserInput::Message(text) => {
                write!(out, "\n< AI: ")?;
                out.flush()?;
                match session.send_turn(text, out, interrupt()).await {
                    Ok(()) => writeln!(out)?,
                    Err(BorError::Interrupted) => writeln!(out, "\n[Interrupted]")?,
                    Err(e) => writeln!(out, "\n[Error]: {}", e)?,
                }
            }
        }
    }

    writeln!(out, "\nChat session ended.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use borane_openrouter::{ClientConfig, GenerationParams, OpenRouterClient};
    use crate::test_server::{dead_url, serve, sse_response};
    use std::future::{pending, ready};

    fn session(base_url: &str) -> ChatSession {
        let config = ClientConfig::default().with_base_url(base_url);
        let client = OpenRouterClient::with_config("sk-test", config).unwrap();
        ChatSession::new(client, "test/model".to_string(), GenerationParams::default())
    }

    #[tokio::test]
    async fn blank_lines_and_quit_send_nothing() {
        let mut session = session(&dead_url().await);
        let mut out = Vec::new();

        run_interactive(&mut session, &b"\n   \nQuit\nnever sent\n"[..], &mut out, pending::<()>)
            .await
            .unwrap();

        assert!(session.history().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Starting chat with model: test/model"));
        assert!(text.ends_with("Chat session ended.\n"));
        assert!(!text.contains("< AI:"));
    }

    #[tokio::test]
    async fn eof_ends_the_loop() {
        let mut session = session(&dead_url().await);
        let mut out = Vec::new();

        run_interactive(&mut session, &b""[..], &mut out, pending::<()>).await.unwrap();

        assert!(String::from_utf8(out).unwrap().contains("Chat session ended."));
    }

    #[tokio::test]
    async fn failed_turn_is_reported_and_loop_continues() {
        let mut session = session(&dead_url().await);
        let mut out = Vec::new();

        run_interactive(&mut session, &b"hello\nagain\nexit\n"[..], &mut out, pending::<()>)
            .await
            .unwrap();

        assert!(session.history().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("[Error]:").count(), 2);
        assert!(text.contains("Chat session ended."));
    }

    #[tokio::test]
    async fn streamed_reply_is_printed() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi \"}}]}\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"there\"}}]}\n\n\
                    data: [DONE]\n\n";
        let (base_url, _server) = serve(vec![sse_response(body)]).await;
        let mut session = session(&base_url);
        let mut out = Vec::new();

        run_interactive(&mut session, &b"hello\n"[..], &mut out, pending::<()>)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("< AI: Hi there\n"));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].text(), "Hi there");
    }

    #[tokio::test]
    async fn interrupt_at_prompt_ends_session() {
        let mut session = session(&dead_url().await);
        let mut out = Vec::new();
        // Keeping the writer alive means the reader never sees EOF.
        let (_keyboard, stdin) = tokio::io::duplex(64);

        let stdin = tokio::io::BufReader::new(stdin);
        run_interactive(&mut session, stdin, &mut out, || ready(()))
            .await
            .unwrap();

        assert!(session.history().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Chat session ended.\n"));
        assert!(!text.contains("< AI:"));
    }

    #[tokio::test]
    async fn one_shot_propagates_failure() {
        let mut session = session(&dead_url().await);
        let mut out = Vec::new();

        let result = run_once(&mut session, "hello", &mut out).await;

        assert!(matches!(result, Err(BorError::OpenRouter(_))));
    }
}
