//! Chat state driven by stream session events.
//!
//! `ChatState` is what a chat front end renders: the committed message
//! history, the reply being streamed, and the loading/error flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ChatError;
use crate::model::{ChatRequest, LocationContext};
use crate::session::StreamHandler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A committed chat message. Never modified after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: String) -> Self {
        Self {
            role,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// State transitions applied to `ChatState`.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatAction {
    /// The user sent a message.
    Submit(String),
    /// A reply token arrived.
    Token(String),
    /// The reply finished with the session's accumulated text.
    Complete(String),
    /// The exchange failed.
    Fail(String),
    /// The caller aborted the exchange.
    Cancel,
    /// The user dismissed the error notice.
    DismissError,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatState {
    /// Append-only history.
    pub messages: Vec<ChatMessage>,
    /// Reply text received so far for the in-flight exchange.
    pub streaming: String,
    pub is_loading: bool,
    /// Message of the last failed exchange, until dismissed.
    pub error: Option<String>,
}

impl ChatState {
    /// Applies one action.
    ///
    /// Stream actions (`Token`, `Complete`, `Fail`, `Cancel`) are ignored when
    /// no exchange is in flight, and `Submit` is ignored while one is, so a
    /// late event from a finished session cannot corrupt the history.
    pub fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::Submit(text) => {
                if self.is_loading || text.trim().is_empty() {
                    return;
                }
                self.messages.push(ChatMessage::new(ChatRole::User, text));
                self.streaming.clear();
                self.error = None;
                self.is_loading = true;
            }
            ChatAction::Token(text) => {
                if self.is_loading {
                    self.streaming.push_str(&text);
                }
            }
            ChatAction::Complete(reply) => {
                if !self.is_loading {
                    return;
                }
                if !reply.is_empty() {
                    self.messages
                        .push(ChatMessage::new(ChatRole::Assistant, reply));
                }
                self.finish();
            }
            ChatAction::Fail(message) => {
                if !self.is_loading {
                    return;
                }
                self.error = Some(message);
                self.finish();
            }
            ChatAction::Cancel => {
                if self.is_loading {
                    self.finish();
                }
            }
            ChatAction::DismissError => self.error = None,
        }
    }

    /// Submits `text` and returns the request to stream, or `None` when the
    /// text is blank or an exchange is already in flight.
    pub fn begin(
        &mut self,
        text: impl Into<String>,
        location: Option<LocationContext>,
    ) -> Option<ChatRequest> {
        let text = text.into();
        if self.is_loading || text.trim().is_empty() {
            return None;
        }
        self.apply(ChatAction::Submit(text.clone()));
        Some(ChatRequest::new(text).with_location(location))
    }

    /// Returns the last committed message.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    fn finish(&mut self) {
        self.streaming.clear();
        self.is_loading = false;
    }
}

impl StreamHandler for ChatState {
    fn on_token(&mut self, text: &str) {
        self.apply(ChatAction::Token(text.to_string()));
    }

    fn on_complete(&mut self, reply: String) {
        self.apply(ChatAction::Complete(reply));
    }

    fn on_error(&mut self, error: ChatError) {
        self.apply(ChatAction::Fail(error.message().to_string()));
    }
}
