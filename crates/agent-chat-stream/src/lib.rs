//! Streaming client for the agent chat backend.
//!
//! The backend answers `POST /api/chat/stream` with Server-Sent Events whose
//! payloads are `{"token": ...}`, `{"done": true}` or `{"error": ...}`. A
//! [`StreamSession`] turns that byte stream into handler callbacks with a
//! single terminal outcome per exchange.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agent_chat_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new(ChatClientConfig::new("http://localhost:8000"))?);
//! let mut state = ChatState::default();
//!
//! if let Some(request) = state.begin("What is the capital of France?", None) {
//!     StreamSession::new(transport).open(&request, &mut state).await;
//! }
//! println!("{:?}", state.last_message());
//! # Ok(())
//! # }
//! ```

/// Error types.
pub mod errors;
/// Request and response bodies of the chat backend.
pub mod model;
/// Tracing subscriber setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Chat state reducer consuming session events.
pub mod reducer;
/// Stream session, handler contract and abort handle.
pub mod session;
/// SSE frame decoder and event classifier.
pub mod sse;
/// Classified stream events.
pub mod stream;
/// Transport seam and the `reqwest` implementation.
pub mod transport;

pub use errors::{ChatError, ConfigError, ValidationError};
pub use model::{ChatRequest, HealthStatus, LocationContext, MAX_MESSAGE_CHARS};
pub use observability::{LogOutput, LogSettings, init_observability};
pub use reducer::{ChatAction, ChatMessage, ChatRole, ChatState};
pub use session::{
    AbortHandle, Callbacks, SessionOutcome, SessionState, StreamHandler, StreamSession,
};
pub use sse::{Frame, FrameDecoder, classify};
pub use stream::StreamEvent;
pub use transport::{ChatClientConfig, ChatTransport, ChunkStream, HttpTransport, StreamResponse};
