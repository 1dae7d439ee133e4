use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::RagService;
use crate::domain::DomainError;

/// Inputs that end the session, compared case-insensitively.
pub const EXIT_COMMANDS: [&str; 4] = [":sair", ":q", ":quit", ":exit"];

const BANNER: &str = "======== CHAT PDF (RAG with Qdrant) ========\n\
                      Type your question and press Enter.\n\
                      Commands: :sair (or :q / :quit / :exit) to quit\n\n";
const PROMPT: &str = "> ";
const ANSWER_HEADER: &str = "\n--- Answer ---\n";
const ANSWER_FOOTER: &str = "----------------\n\n";

#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, DomainError>;
}

#[async_trait]
impl Answerer for RagService {
    async fn answer(&self, question: &str) -> Result<String, DomainError> {
        self.answer_top_k(question, self.default_top_k()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Command,
    EndOfInput,
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(input))
}

/// Reads questions line by line until an exit command or end of input.
///
/// A failed question is reported inline and the loop keeps going.
pub async fn run<A, R, W>(answerer: &A, input: R, output: &mut W) -> std::io::Result<ExitReason>
where
    A: Answerer + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output.write_all(BANNER.as_bytes()).await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\nClosing...\n").await?;
            output.flush().await?;
            return Ok(ExitReason::EndOfInput);
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        if is_exit_command(question) {
            output.write_all(b"Bye!\n").await?;
            output.flush().await?;
            return Ok(ExitReason::Command);
        }

        match answerer.answer(question).await {
            Ok(answer) => {
                output.write_all(ANSWER_HEADER.as_bytes()).await?;
                output.write_all(answer.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.write_all(ANSWER_FOOTER.as_bytes()).await?;
            }
            Err(e) => {
                tracing::debug!(error = %e, "question failed");
                output.write_all(format!("[error] {e}\n\n").as_bytes()).await?;
            }
        }
    }
}
