/// Application event classified from one SSE frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental reply text. Never empty.
    Token(String),
    /// The backend finished the reply.
    Done,
    /// The backend reported a failure; the message is passed through verbatim.
    Error(String),
}

impl StreamEvent {
    /// Returns true for `Done` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }
}
