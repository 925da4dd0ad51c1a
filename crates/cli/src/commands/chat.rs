//! Interactive chat session: the terminal front end for the datachat
//! server. Keeps an in-memory transcript for the session, sends each user
//! line to the `/chat` endpoint (one attempt, no retry), and renders the
//! reply — or an inline error — as the assistant turn.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use datachat_core::chat::{ChatTurn, Transcript};
use datachat_core::config::{AppConfig, LoadOptions};

const THINKING_PLACEHOLDER: &str = "thinking...";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Transport(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("backend reply could not be decoded: {0}")]
    InvalidReply(String),
}

#[async_trait]
pub trait ChatBackend {
    async fn send(&self, message: &str) -> Result<String, BackendError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: String) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| BackendError::Transport(error.to_string()))?;
        Ok(Self { client, url })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|error| BackendError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|error| BackendError::InvalidReply(error.to_string()))?;
        Ok(payload.reply)
    }
}

/// Every user turn gains exactly one assistant turn, even when the backend
/// is unreachable; the failure is rendered inline instead of crashing the
/// session.
fn assistant_turn(outcome: Result<String, BackendError>) -> ChatTurn {
    match outcome {
        Ok(reply) => ChatTurn::assistant(reply),
        Err(error) => ChatTurn::assistant(format!("Error communicating with backend: {error}")),
    }
}

pub async fn run_session<B, R, W>(
    backend: &B,
    input: R,
    output: &mut W,
) -> io::Result<Transcript>
where
    B: ChatBackend,
    R: BufRead,
    W: Write,
{
    let mut transcript = Transcript::new();
    let mut lines = input.lines();

    loop {
        write!(output, "you> ")?;
        output.flush()?;

        let Some(line) = lines.next() else { break };
        let message = line?;
        let message = message.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        transcript.push(ChatTurn::user(message));

        write!(output, "datachat> {THINKING_PLACEHOLDER}\r")?;
        output.flush()?;

        let turn = assistant_turn(backend.send(message).await);
        write!(output, "\x1b[2K")?;
        writeln!(output, "datachat> {}", turn.content)?;
        transcript.push(turn);
    }

    writeln!(output)?;
    Ok(transcript)
}

/// The front end only needs a backend URL; a configuration that fails
/// server-side validation (no warehouse project, no LLM key) must not keep
/// the chat client from starting.
fn resolve_backend_url(flag: Option<String>) -> String {
    if let Some(url) = flag {
        return url;
    }

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config.frontend.backend_url,
        Err(_) => std::env::var("DATACHAT_BACKEND_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| AppConfig::default().frontend.backend_url),
    }
}

pub async fn run(backend_url: Option<String>) -> ExitCode {
    let url = resolve_backend_url(backend_url);
    let backend = match HttpBackend::new(url.clone()) {
        Ok(backend) => backend,
        Err(error) => {
            eprintln!("could not start chat session: {error}");
            return ExitCode::FAILURE;
        }
    };

    println!("datachat — ask questions about your warehouse data (`exit` to quit)");
    println!("backend: {url}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match run_session(&backend, stdin.lock(), &mut stdout).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("chat session ended with an I/O error: {error}");
            ExitCode::FAILURE
        }
    }
}
