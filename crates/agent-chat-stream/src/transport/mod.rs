//! Transport seam between stream sessions and the HTTP client.
//!
//! The transport only issues the request and hands back the status and the
//! raw body; status policy, decoding and dispatch belong to the session.
//! Intermediaries between client and backend must forward each frame as it is
//! written (no proxy buffering); the client cannot detect or repair a proxy
//! that coalesces frames.
mod config;
mod http;

use std::pin::Pin;

pub use config::ChatClientConfig;
pub use http::HttpTransport;

use crate::errors::ChatError;
use crate::model::ChatRequest;

/// Chunked response body. Dropping it releases the underlying connection.
pub type ChunkStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, ChatError>> + Send + 'static>>;

/// An opened streaming response.
pub struct StreamResponse {
    /// HTTP status of the response.
    pub status: reqwest::StatusCode,
    /// Response body as raw chunks.
    pub body: ChunkStream,
}

/// Issues the streaming chat request.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `request` and returns the response status with its unread body.
    ///
    /// Returns `ChatError::Transport` when no response could be obtained.
    async fn open_stream(&self, request: &ChatRequest) -> Result<StreamResponse, ChatError>;
}
