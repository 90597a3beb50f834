use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::{Instrument as _, debug, info_span, warn};

use crate::errors::ChatError;
use crate::model::ChatRequest;
use crate::sse::{Frame, FrameDecoder, classify};
use crate::stream::StreamEvent;
use crate::transport::{ChatTransport, ChunkStream, StreamResponse};

/// Receives the outcome of a stream session as it happens.
///
/// Per session `on_token` fires zero or more times, in byte-arrival order,
/// followed by at most one of `on_complete` / `on_error`. A cancelled session
/// fires neither.
pub trait StreamHandler {
    /// A non-empty increment of reply text.
    fn on_token(&mut self, text: &str);
    /// The reply finished. `reply` is every token of this session concatenated.
    fn on_complete(&mut self, reply: String);
    /// The exchange failed.
    fn on_error(&mut self, error: ChatError);
}

/// `StreamHandler` built from three closures.
pub struct Callbacks<T, C, E> {
    on_token: T,
    on_complete: C,
    on_error: E,
}

impl<T, C, E> Callbacks<T, C, E>
where
    T: FnMut(&str),
    C: FnMut(String),
    E: FnMut(ChatError),
{
    pub fn new(on_token: T, on_complete: C, on_error: E) -> Self {
        Self {
            on_token,
            on_complete,
            on_error,
        }
    }
}

impl<T, C, E> StreamHandler for Callbacks<T, C, E>
where
    T: FnMut(&str),
    C: FnMut(String),
    E: FnMut(ChatError),
{
    fn on_token(&mut self, text: &str) {
        (self.on_token)(text)
    }

    fn on_complete(&mut self, reply: String) {
        (self.on_complete)(reply)
    }

    fn on_error(&mut self, error: ChatError) {
        (self.on_error)(error)
    }
}

struct Discard;

impl StreamHandler for Discard {
    fn on_token(&mut self, _text: &str) {}
    fn on_complete(&mut self, _reply: String) {}
    fn on_error(&mut self, _error: ChatError) {}
}

/// Lifecycle of a stream session.
///
/// `Idle -> Open -> (Completing | Failing) -> Closed`, or `Open -> Closed` on
/// cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Open,
    Completing,
    Failing,
    Closed,
}

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// `on_complete` fired with `reply`.
    Completed { reply: String },
    /// `on_error` fired with this error (or the session was reused).
    Failed(ChatError),
    /// The caller aborted; no terminal callback fired.
    Cancelled,
}

impl SessionOutcome {
    /// Converts the outcome into the reply text or an error.
    pub fn into_result(self) -> Result<String, ChatError> {
        match self {
            Self::Completed { reply } => Ok(reply),
            Self::Failed(error) => Err(error),
            Self::Cancelled => Err(ChatError::Cancelled),
        }
    }
}

/// Handle used to abort a stream session from elsewhere.
#[derive(Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation.
    ///
    /// Takes effect at the session's next suspension point (request send or
    /// body read). Aborting a finished session has no effect.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once `abort` was called.
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

async fn aborted(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|aborted| *aborted).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// One request/response streaming exchange with the chat backend.
///
/// The session owns the response body and the frame buffer for its whole
/// lifetime; the body is dropped exactly once, on whichever exit path ends
/// the exchange.
pub struct StreamSession {
    id: uuid::Uuid,
    transport: Arc<dyn ChatTransport>,
    abort: AbortHandle,
    state: SessionState,
}

impl StreamSession {
    /// Creates an idle session over `transport`.
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            transport,
            abort: AbortHandle::new(),
            state: SessionState::Idle,
        }
    }

    /// Session id used in log lines.
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns a handle that can abort this session.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Runs the exchange to its end, dispatching events to `handler`.
    ///
    /// A session runs once; calling `open` again returns
    /// `SessionOutcome::Failed` without touching `handler`.
    pub async fn open<H>(&mut self, request: &ChatRequest, handler: &mut H) -> SessionOutcome
    where
        H: StreamHandler + ?Sized,
    {
        let span = info_span!("chat_session", session_id = %self.id);
        self.run(request, handler).instrument(span).await
    }

    /// Runs the exchange and returns the complete reply.
    pub async fn collect_text(&mut self, request: &ChatRequest) -> Result<String, ChatError> {
        self.open(request, &mut Discard).await.into_result()
    }

    async fn run<H>(&mut self, request: &ChatRequest, handler: &mut H) -> SessionOutcome
    where
        H: StreamHandler + ?Sized,
    {
        if self.state != SessionState::Idle {
            warn!(state = ?self.state, "stream session already used");
            return SessionOutcome::Failed(ChatError::protocol("stream session already used"));
        }
        self.state = SessionState::Open;
        debug!(
            message_chars = request.message.chars().count(),
            has_location = request.location.is_some(),
            "opening chat stream"
        );

        let mut abort_rx = self.abort.subscribe();
        let transport = Arc::clone(&self.transport);
        let opened = tokio::select! {
            biased;
            _ = aborted(&mut abort_rx) => None,
            opened = transport.open_stream(request) => Some(opened),
        };

        let StreamResponse { status, body } = match opened {
            None => return self.cancel(),
            Some(Err(error)) => return self.fail(handler, error),
            Some(Ok(response)) => response,
        };
        if !status.is_success() {
            drop(body);
            return self.fail(handler, ChatError::status(status));
        }
        self.pump(body, &mut abort_rx, handler).await
    }

    // Owns `body` so every return path releases it.
    async fn pump<H>(
        &mut self,
        mut body: ChunkStream,
        abort_rx: &mut watch::Receiver<bool>,
        handler: &mut H,
    ) -> SessionOutcome
    where
        H: StreamHandler + ?Sized,
    {
        let mut decoder = FrameDecoder::default();
        let mut reply = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = aborted(abort_rx) => None,
                next = body.next() => Some(next),
            };
            let Some(next) = next else {
                return self.cancel();
            };
            match next {
                Some(Ok(chunk)) => {
                    for frame in decoder.feed(&chunk) {
                        // A handler may abort between frames of one chunk.
                        if *abort_rx.borrow() {
                            return self.cancel();
                        }
                        if let Some(outcome) = self.dispatch(&frame, handler, &mut reply) {
                            return outcome;
                        }
                    }
                }
                Some(Err(error)) => return self.fail(handler, error),
                None => break,
            }
        }

        if *abort_rx.borrow() {
            return self.cancel();
        }
        if let Some(frame) = decoder.finish()
            && let Some(outcome) = self.dispatch(&frame, handler, &mut reply)
        {
            return outcome;
        }
        debug!("chat stream closed without a terminal frame");
        self.complete(handler, reply)
    }

    fn dispatch<H>(
        &mut self,
        frame: &Frame,
        handler: &mut H,
        reply: &mut String,
    ) -> Option<SessionOutcome>
    where
        H: StreamHandler + ?Sized,
    {
        match classify(frame)? {
            StreamEvent::Token(text) => {
                reply.push_str(&text);
                handler.on_token(&text);
                None
            }
            StreamEvent::Done => Some(self.complete(handler, std::mem::take(reply))),
            StreamEvent::Error(message) => Some(self.fail(handler, ChatError::backend(message))),
        }
    }

    fn complete<H>(&mut self, handler: &mut H, reply: String) -> SessionOutcome
    where
        H: StreamHandler + ?Sized,
    {
        if !self.enter_terminal(SessionState::Completing) {
            return SessionOutcome::Failed(ChatError::protocol("terminal outcome already delivered"));
        }
        debug!(reply_chars = reply.chars().count(), "chat stream completed");
        handler.on_complete(reply.clone());
        self.state = SessionState::Closed;
        SessionOutcome::Completed { reply }
    }

    fn fail<H>(&mut self, handler: &mut H, error: ChatError) -> SessionOutcome
    where
        H: StreamHandler + ?Sized,
    {
        if !self.enter_terminal(SessionState::Failing) {
            return SessionOutcome::Failed(ChatError::protocol("terminal outcome already delivered"));
        }
        warn!(error = %error, "chat stream failed");
        handler.on_error(error.clone());
        self.state = SessionState::Closed;
        SessionOutcome::Failed(error)
    }

    fn cancel(&mut self) -> SessionOutcome {
        debug!("chat stream cancelled");
        self.state = SessionState::Closed;
        SessionOutcome::Cancelled
    }

    fn enter_terminal(&mut self, next: SessionState) -> bool {
        if self.state != SessionState::Open {
            return false;
        }
        self.state = next;
        true
    }
}
