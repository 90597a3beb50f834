use futures::TryStreamExt as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::errors::{ChatError, ConfigError};
use crate::model::{ChatRequest, HealthStatus};

use super::config::ChatClientConfig;
use super::{ChatTransport, ChunkStream, StreamResponse};

const EVENT_STREAM: &str = "text/event-stream";

/// `reqwest`-backed transport for the chat backend.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ChatClientConfig,
}

impl HttpTransport {
    /// Creates a transport from explicit configuration.
    pub fn new(config: ChatClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Creates a transport from `AGENT_API_URL` and related variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ChatClientConfig::from_env()?)
    }

    /// Returns the configuration this transport was built with.
    pub fn config(&self) -> &ChatClientConfig {
        &self.config
    }

    /// Queries the backend health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ChatError> {
        let url = self.config.health_url();
        debug!(%url, "checking chat backend health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChatError::transport(format!("health request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                message: format!("health request failed with status {status}"),
            });
        }
        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| ChatError::transport(format!("invalid health response: {e}")))
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn open_stream(&self, request: &ChatRequest) -> Result<StreamResponse, ChatError> {
        let url = self.config.stream_url();
        debug!(%url, has_location = request.location.is_some(), "sending chat stream request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, EVENT_STREAM)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat stream request failed");
                ChatError::transport(format!("chat stream request failed: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if !content_type.starts_with(EVENT_STREAM) {
                debug!(content_type, "chat stream response is not text/event-stream");
            }
        }

        let body: ChunkStream = Box::pin(
            response
                .bytes_stream()
                .map_err(|e| ChatError::transport(format!("chat stream read failed: {e}"))),
        );
        Ok(StreamResponse { status, body })
    }
}
