use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Longest message (in characters) the chat backend accepts.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// User location forwarded to the backend as context.
///
/// Supplied by an external geolocation lookup. Fields are passed through as-is
/// and absent fields are omitted from the request body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// IANA timezone, for example `America/New_York`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationContext {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.timezone.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// Body of `POST /api/chat/stream`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationContext>,
}

impl ChatRequest {
    /// Creates a request without location context.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Attaches location context. An empty location is dropped so the field
    /// is omitted from the request.
    pub fn with_location(mut self, location: Option<LocationContext>) -> Self {
        self.location = location.filter(|l| !l.is_empty());
        self
    }

    /// Checks the constraints the backend enforces on `message`.
    ///
    /// Stream sessions do not call this; an invalid request is forwarded and
    /// the backend's rejection is reported like any other status error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let len = self.message.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }
        Ok(())
    }
}

/// Response of `GET /api/health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// `ready` or `not_initialized`.
    pub agent: String,
}

impl HealthStatus {
    /// Returns true when the backend and its agent can serve chat requests.
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.agent == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_location_omits_the_field() {
        let body = serde_json::to_value(ChatRequest::new("hi")).expect("serialize");
        assert_eq!(body, serde_json::json!({"message": "hi"}));
    }

    #[test]
    fn location_fields_are_forwarded_and_absent_ones_omitted() {
        let request = ChatRequest::new("weather?").with_location(Some(LocationContext {
            city: Some("Indianapolis".into()),
            timezone: Some("America/Indiana/Indianapolis".into()),
            latitude: Some(39.7684),
            ..LocationContext::default()
        }));
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "message": "weather?",
                "location": {
                    "city": "Indianapolis",
                    "timezone": "America/Indiana/Indianapolis",
                    "latitude": 39.7684
                }
            })
        );
    }

    #[test]
    fn empty_location_is_dropped() {
        let request = ChatRequest::new("hi").with_location(Some(LocationContext::default()));
        assert!(request.location.is_none());
    }

    #[test]
    fn validate_rejects_blank_and_oversized_messages() {
        assert_eq!(
            ChatRequest::new("   ").validate(),
            Err(ValidationError::EmptyMessage)
        );
        let long = "é".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            ChatRequest::new(long).validate(),
            Err(ValidationError::MessageTooLong {
                len: MAX_MESSAGE_CHARS + 1,
                max: MAX_MESSAGE_CHARS
            })
        );
        assert!(
            ChatRequest::new("é".repeat(MAX_MESSAGE_CHARS))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn health_readiness_requires_healthy_and_ready() {
        let ready: HealthStatus =
            serde_json::from_str(r#"{"status":"healthy","agent":"ready"}"#).expect("parse");
        assert!(ready.is_ready());
        let down: HealthStatus =
            serde_json::from_str(r#"{"status":"unhealthy","agent":"not_initialized"}"#)
                .expect("parse");
        assert!(!down.is_ready());
    }
}
