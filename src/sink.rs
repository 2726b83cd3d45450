/// Durable detection event log
///
/// Append-only writer against a Firebase Realtime Database REST endpoint.
/// Each detection becomes one immutable record under an auto-generated key
/// in the `detections` node. There is no read path and no deduplication: a
/// condition that persists across cycles produces one event per cycle.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::SinkError;
use crate::monitor::EventSink;

const DETECTIONS_NODE: &str = "detections";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Category of a detection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    NsfwDetected,
    ToxicText,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::NsfwDetected => "NSFW_DETECTED",
            EventType::ToxicText => "TOXIC_TEXT",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable detection record. The timestamp is assigned at write time.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionEvent {
    pub event_type: String,
    pub event_message: String,
    pub timestamp: String,
}

impl DetectionEvent {
    pub fn new(event_type: EventType, message: &str) -> Self {
        Self {
            event_type: event_type.as_str().to_string(),
            event_message: message.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

/// The store answers a push with the generated key.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

pub struct RealtimeDbSink {
    agent: ureq::Agent,
    node_url: String,
    auth: Option<String>,
}

impl RealtimeDbSink {
    /// Open the event store connection and verify it before the monitor
    /// loop is allowed to start (fail closed: an unreachable store or a
    /// rejected credential aborts startup).
    pub fn connect(database_url: &str, auth: Option<&str>) -> Result<Self, SinkError> {
        let base = database_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(SinkError::NotConfigured);
        }

        let sink = Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            node_url: format!("{base}/{DETECTIONS_NODE}.json"),
            auth: auth.map(str::to_string),
        };

        sink.probe().map_err(|e| SinkError::ConnectFailed {
            url: database_url.to_string(),
            source: e,
        })?;

        tracing::info!("Event store connection established");
        Ok(sink)
    }

    /// Shallow read of the detections node; cheap, and rejected credentials
    /// surface here instead of at the first detection.
    fn probe(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut request = self.agent.get(&self.node_url).query("shallow", "true");
        if let Some(token) = &self.auth {
            request = request.query("auth", token);
        }
        request.call()?;
        Ok(())
    }
}

impl EventSink for RealtimeDbSink {
    fn record(&mut self, event_type: EventType, message: &str) -> Result<(), SinkError> {
        let event = DetectionEvent::new(event_type, message);

        let mut request = self.agent.post(&self.node_url);
        if let Some(token) = &self.auth {
            request = request.query("auth", token);
        }
        let response = request
            .send_json(&event)
            .map_err(|e| SinkError::WriteFailed(Box::new(e)))?;

        match response.into_json::<PushResponse>() {
            Ok(push) => tracing::debug!(key = %push.name, "detection event recorded: {event_type}"),
            Err(e) => tracing::debug!("detection event recorded ({e})"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_wire_names() {
        assert_eq!(EventType::NsfwDetected.as_str(), "NSFW_DETECTED");
        assert_eq!(EventType::ToxicText.as_str(), "TOXIC_TEXT");
        assert_eq!(EventType::ToxicText.to_string(), "TOXIC_TEXT");
    }

    #[test]
    fn test_event_payload_shape() {
        let event = DetectionEvent::new(EventType::NsfwDetected, "Explicit imagery detected.");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event_type"], "NSFW_DETECTED");
        assert_eq!(json["event_message"], "Explicit imagery detected.");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_event_timestamp_is_rfc3339() {
        let event = DetectionEvent::new(EventType::ToxicText, "msg");
        assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
    }

    #[test]
    fn test_connect_rejects_empty_url() {
        match RealtimeDbSink::connect("", None) {
            Err(SinkError::NotConfigured) => {}
            Err(e) => panic!("expected NotConfigured, got {e}"),
            Ok(_) => panic!("connect succeeded with an empty URL"),
        }
    }
}
