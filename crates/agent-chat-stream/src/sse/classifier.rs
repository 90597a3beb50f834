use serde_json::Value;
use tracing::debug;

use super::decoder::Frame;
use crate::stream::StreamEvent;

/// Classifies a frame's JSON payload.
///
/// Checked in priority order: a truthy `error` wins over everything, then a
/// truthy `done`, then a non-empty string `token`. Payloads that fail to parse
/// or match none of these shapes yield `None` and are only logged.
pub fn classify(frame: &Frame) -> Option<StreamEvent> {
    let value: Value = match serde_json::from_str(&frame.data) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, payload_len = frame.data.len(), "ignoring malformed frame");
            return None;
        }
    };
    let Some(object) = value.as_object() else {
        debug!("ignoring non-object frame payload");
        return None;
    };

    if let Some(error) = object.get("error").filter(|v| is_truthy(v)) {
        let message = match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Some(StreamEvent::Error(message));
    }
    if object.get("done").is_some_and(is_truthy) {
        return Some(StreamEvent::Done);
    }
    match object.get("token") {
        Some(Value::String(text)) if !text.is_empty() => Some(StreamEvent::Token(text.clone())),
        Some(Value::String(_)) => None,
        _ => {
            debug!("ignoring frame with no recognized field");
            None
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
