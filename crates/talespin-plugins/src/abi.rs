//! JSON wire types crossing the WASM guest boundary.
//!
//! Guests receive a [`WireEvent`] as the input to their `handle_event`
//! export and may answer with a [`Response`]. Empty output means the guest
//! has nothing to emit; anything else must parse as a `Response` or the
//! delivery fails.

use serde::{Deserialize, Serialize};

use talespin_core::{ActorKind, Event, EventType};

use crate::error::{PluginError, PluginResult};

/// The event structure passed to plugins.
///
/// A flattened version of the engine [`Event`], serialized as JSON for the
/// WASM boundary. The payload stays an embedded JSON string so guests can
/// ignore bodies they don't care about without parsing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Event ID as a string.
    pub id: String,
    /// Stream the event was published to.
    pub stream: String,
    /// Event type tag.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Unix milliseconds.
    pub timestamp: i64,
    /// Numeric actor kind (`2` = plugin).
    pub actor_kind: ActorKind,
    /// Character ID, plugin name, or `"system"`.
    pub actor_id: String,
    /// Event body as an embedded JSON string.
    pub payload: String,
}

impl WireEvent {
    /// Flatten an engine event into its wire form.
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            stream: event.stream.clone(),
            event_type: event.event_type.clone(),
            timestamp: event.timestamp.timestamp_millis(),
            actor_kind: event.actor.kind,
            actor_id: event.actor.id.clone(),
            payload: String::from_utf8_lossy(&event.payload).into_owned(),
        }
    }
}

/// What a plugin returns after handling an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Events to emit. Each is published to its stream after validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EmitEvent>,
}

/// An event a plugin wants to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitEvent {
    /// Target stream. Must be non-empty; the subscriber rejects the rest.
    pub stream: String,
    /// Event type tag.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Event body as an embedded JSON string.
    pub payload: String,
}

/// Parse raw guest output into emitted events.
///
/// Empty output means the guest chose not to respond. Anything else must be
/// a syntactically valid [`Response`].
///
/// # Errors
///
/// Returns [`PluginError::MalformedResponse`] when the output is non-empty
/// but not valid response JSON.
pub fn parse_response(output: &[u8]) -> PluginResult<Vec<EmitEvent>> {
    if output.is_empty() {
        return Ok(Vec::new());
    }
    let response: Response =
        serde_json::from_slice(output).map_err(PluginError::MalformedResponse)?;
    Ok(response.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use talespin_core::{Actor, SayPayload};

    #[test]
    fn wire_event_field_mapping() {
        let payload = serde_json::to_vec(&SayPayload::new("hello")).unwrap();
        let event = Event::new(
            "location:01ABC",
            EventType::Say,
            Actor::plugin("echo"),
            payload,
        );
        let wire = WireEvent::from_event(&event);

        assert_eq!(wire.id, event.id.to_string());
        assert_eq!(wire.stream, "location:01ABC");
        assert_eq!(wire.event_type, EventType::Say);
        assert_eq!(wire.actor_kind, ActorKind::Plugin);
        assert_eq!(wire.actor_id, "echo");
        assert_eq!(wire.payload, r#"{"message":"hello"}"#);
    }

    #[test]
    fn wire_event_json_shape() {
        let event = Event::new(
            "location:01ABC",
            EventType::Say,
            Actor::character("01XYZ"),
            b"{}".to_vec(),
        );
        let json: serde_json::Value =
            serde_json::to_value(WireEvent::from_event(&event)).unwrap();

        assert_eq!(json["type"], "say");
        assert_eq!(json["actor_kind"], 0);
        assert_eq!(json["stream"], "location:01ABC");
        assert!(json["timestamp"].is_i64());
        assert!(json["payload"].is_string());
    }

    #[test]
    fn parse_response_empty_output() {
        assert!(parse_response(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_response_empty_object() {
        assert!(parse_response(b"{}").unwrap().is_empty());
    }

    #[test]
    fn parse_response_with_events() {
        let raw = br#"{"events":[{"stream":"location:01ABC","type":"say","payload":"{\"message\":\"Echo: hi\"}"}]}"#;
        let events = parse_response(raw).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stream, "location:01ABC");
        assert_eq!(events[0].event_type, EventType::Say);
    }

    #[test]
    fn parse_response_truncated_json_is_error() {
        // The exact output of the malformed-json fixture guest.
        let raw = br#"{"events": [{"stream": "test""#;
        let err = parse_response(raw).unwrap_err();
        assert!(matches!(err, PluginError::MalformedResponse(_)));
    }

    #[test]
    fn response_round_trip() {
        let response = Response {
            events: vec![EmitEvent {
                stream: "location:01ABC".to_string(),
                event_type: EventType::Say,
                payload: r#"{"message":"hi"}"#.to_string(),
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }
}
