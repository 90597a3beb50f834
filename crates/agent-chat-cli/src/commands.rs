use std::io::Write as _;
use std::sync::Arc;

use agent_chat_stream::prelude::*;
use anyhow::{Result, bail};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::task::JoinHandle;
use tracing::warn;

pub async fn health(transport: &HttpTransport) -> Result<()> {
    let health = transport.health().await?;
    println!("status: {}\nagent:  {}", health.status, health.agent);
    if !health.is_ready() {
        bail!("backend at {} is not ready", transport.config().base_url);
    }
    Ok(())
}

pub async fn ask(
    transport: Arc<HttpTransport>,
    message: String,
    location: Option<LocationContext>,
) -> Result<()> {
    let request = ChatRequest::new(message).with_location(location);
    if let Err(e) = request.validate() {
        warn!(error = %e, "sending a message the backend is likely to reject");
    }

    let mut session = StreamSession::new(transport);
    let ctrl_c = abort_on_ctrl_c(session.abort_handle());
    let outcome = session.open(&request, &mut TokenPrinter).await;
    ctrl_c.abort();
    println!();
    ask_result(outcome)
}

/// Failures surface once, as the command's error.
fn ask_result(outcome: SessionOutcome) -> Result<()> {
    match outcome {
        SessionOutcome::Completed { .. } => Ok(()),
        SessionOutcome::Failed(error) => Err(error.into()),
        SessionOutcome::Cancelled => {
            eprintln!("[cancelled]");
            Ok(())
        }
    }
}

pub async fn chat(transport: Arc<HttpTransport>, location: Option<LocationContext>) -> Result<()> {
    let mut state = ChatState::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        let Some(request) = state.begin(line, location.clone()) else {
            prompt();
            continue;
        };

        let mut session = StreamSession::new(transport.clone());
        let ctrl_c = abort_on_ctrl_c(session.abort_handle());
        let outcome = session
            .open(&request, &mut ChatView { state: &mut state })
            .await;
        ctrl_c.abort();
        println!();

        if outcome == SessionOutcome::Cancelled {
            state.apply(ChatAction::Cancel);
            eprintln!("[cancelled]");
        }
        if let Some(error) = &state.error {
            eprintln!("[error] {error}");
            state.apply(ChatAction::DismissError);
        }
        prompt();
    }
    Ok(())
}

fn abort_on_ctrl_c(abort: AbortHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.abort();
        }
    })
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_token(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

struct TokenPrinter;

impl StreamHandler for TokenPrinter {
    fn on_token(&mut self, text: &str) {
        print_token(text);
    }

    fn on_complete(&mut self, _reply: String) {}

    fn on_error(&mut self, _error: ChatError) {}
}

/// Prints tokens as they arrive while folding events into the chat state.
struct ChatView<'a> {
    state: &'a mut ChatState,
}

impl StreamHandler for ChatView<'_> {
    fn on_token(&mut self, text: &str) {
        print_token(text);
        self.state.on_token(text);
    }

    fn on_complete(&mut self, reply: String) {
        self.state.on_complete(reply);
    }

    fn on_error(&mut self, error: ChatError) {
        self.state.on_error(error);
    }
}
