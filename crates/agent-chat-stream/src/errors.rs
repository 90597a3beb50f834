/// Failures of a chat streaming exchange.
///
/// Every variant except `Cancelled` is terminal for a session and reaches the
/// handler through exactly one `StreamHandler::on_error` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The request could not be issued or the body could not be read
    /// (network failure, DNS, TLS, abrupt disconnect).
    #[error("transport error: {message}")]
    Transport { message: String },
    /// The backend answered with a non-success status. The body is not read.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The backend sent an explicit `{"error": ...}` frame.
    #[error("backend error: {message}")]
    Backend { message: String },
    /// The session was used in a way its lifecycle does not allow.
    #[error("protocol error: {message}")]
    Protocol { message: String },
    /// The caller aborted the exchange.
    ///
    /// Only ever returned from result-shaped helpers such as
    /// `StreamSession::collect_text`; never passed to `on_error`.
    #[error("cancelled")]
    Cancelled,
}

impl ChatError {
    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error with a message derived from the status.
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            message: format!("chat stream request failed with status {status}"),
        }
    }

    /// Creates a backend-signaled error carrying the backend's message verbatim.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    ///
    /// For `Backend` errors this is exactly the text the backend sent.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message }
            | Self::Status { message, .. }
            | Self::Backend { message }
            | Self::Protocol { message } => message,
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the HTTP status code for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be used.
    #[error("invalid value for {key}: {message}")]
    InvalidEnv { key: String, message: String },
    /// The backend base URL is empty or not an http(s) URL.
    #[error("invalid base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
    /// The JSON log file could not be opened for writing.
    #[error("cannot write log file {path}: {message}")]
    LogFile { path: String, message: String },
}

/// A chat request the backend is known to reject.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message is {len} characters long, the backend accepts at most {max}")]
    MessageTooLong { len: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_is_derived_from_status_code() {
        let err = ChatError::status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(
            err.message(),
            "chat stream request failed with status 503 Service Unavailable"
        );
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn backend_message_is_kept_verbatim() {
        let err = ChatError::backend("rate limited");
        assert_eq!(err.message(), "rate limited");
        assert_eq!(err.to_string(), "backend error: rate limited");
        assert_eq!(err.status_code(), None);
    }
}
