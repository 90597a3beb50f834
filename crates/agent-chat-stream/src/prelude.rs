//! Common imports for typical client usage.
pub use crate::{
    AbortHandle, Callbacks, ChatAction, ChatClientConfig, ChatError, ChatMessage, ChatRequest,
    ChatRole, ChatState, ChatTransport, HttpTransport, LocationContext, SessionOutcome,
    StreamHandler, StreamSession,
};
