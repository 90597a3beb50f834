use std::time::Duration;

use crate::errors::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the chat backend.
#[derive(Clone, Debug)]
pub struct ChatClientConfig {
    /// Backend root, for example `http://localhost:8000`.
    pub base_url: String,
    /// Path of the streaming chat endpoint.
    pub stream_path: String,
    /// Path of the health endpoint.
    pub health_path: String,
    /// Timeout for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Optional limit on a whole request, body included.
    ///
    /// Unset by default: a streamed reply may legitimately take minutes and
    /// abandoning it is left to the caller's abort handle.
    pub request_timeout: Option<Duration>,
}

impl ChatClientConfig {
    /// Creates a config with default endpoint paths for the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stream_path: "/api/chat/stream".to_string(),
            health_path: "/api/health".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `AGENT_API_URL`: backend root (default `http://localhost:8000`).
    /// - `AGENT_API_CONNECT_TIMEOUT_SECS`: connect timeout in seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("AGENT_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);
        if let Ok(raw) = std::env::var("AGENT_API_CONNECT_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                key: "AGENT_API_CONNECT_TIMEOUT_SECS".into(),
                message: format!("{e}"),
            })?;
            config.connect_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Overrides the streaming endpoint path.
    pub fn stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Overrides the health endpoint path.
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets a whole-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Checks that `base_url` is a non-empty http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "must not be empty".into(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "must start with http:// or https://".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn stream_url(&self) -> String {
        join_url(&self.base_url, &self.stream_path)
    }

    pub(crate) fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
