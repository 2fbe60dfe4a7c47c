//! Echo responder WASM guest.
//!
//! Responds to `say` events from non-plugin actors by echoing the message
//! back on the same stream. Ignores everything else, including its own
//! echoes (actor kind 2 = plugin), so it cannot feed back on itself.
//!
//! Built as a `cdylib` targeting `wasm32-unknown-unknown` for Extism. The
//! host calls the `handle_event` export with the JSON wire event and reads
//! the response, if any, from guest output.

use extism_pdk::*;
use serde::{Deserialize, Serialize};

/// Actor kind tag for plugin-originated events.
const ACTOR_KIND_PLUGIN: u8 = 2;

/// Mirrors the host's wire event. Fields the guest doesn't inspect are
/// left out; serde ignores them.
#[derive(Deserialize)]
struct WireEvent {
    #[serde(default)]
    stream: String,
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    actor_kind: u8,
    #[serde(default)]
    payload: String,
}

#[derive(Serialize)]
struct Response {
    events: Vec<EmitEvent>,
}

#[derive(Serialize)]
struct EmitEvent {
    stream: String,
    #[serde(rename = "type")]
    event_type: String,
    payload: String,
}

#[derive(Default, Serialize, Deserialize)]
struct SayPayload {
    #[serde(default)]
    message: String,
}

/// Decide whether to respond to an event, and with what.
///
/// Returns `None` for events the echo bot ignores: non-`say` types,
/// plugin-originated events, unparseable input, and empty messages.
fn respond(event_json: &str) -> Option<String> {
    let event: WireEvent = serde_json::from_str(event_json).ok()?;

    if event.event_type != "say" {
        return None;
    }
    if event.actor_kind == ACTOR_KIND_PLUGIN {
        return None;
    }

    let payload: SayPayload = serde_json::from_str(&event.payload).unwrap_or_default();
    if payload.message.is_empty() {
        return None;
    }

    let echo = serde_json::to_string(&SayPayload {
        message: format!("Echo: {}", payload.message),
    })
    .ok()?;

    serde_json::to_string(&Response {
        events: vec![EmitEvent {
            stream: event.stream,
            event_type: "say".to_string(),
            payload: echo,
        }],
    })
    .ok()
}

// The macro writes the returned value as the guest output; an empty string
// is zero bytes on the wire, which the host reads as "no emits".
#[plugin_fn]
pub fn handle_event(input: String) -> FnResult<String> {
    Ok(respond(&input).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn say_event(actor_kind: u8, message: &str) -> String {
        serde_json::json!({
            "id": "0193338e-0000-7000-8000-000000000000",
            "stream": "location:01ABC",
            "type": "say",
            "timestamp": 1_700_000_000_000_i64,
            "actor_kind": actor_kind,
            "actor_id": "01XYZ",
            "payload": serde_json::json!({ "message": message }).to_string(),
        })
        .to_string()
    }

    #[test]
    fn echoes_character_say() {
        let response = respond(&say_event(0, "hello")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["events"][0]["stream"], "location:01ABC");
        assert_eq!(parsed["events"][0]["type"], "say");

        let payload: SayPayload =
            serde_json::from_str(parsed["events"][0]["payload"].as_str().unwrap()).unwrap();
        assert_eq!(payload.message, "Echo: hello");
    }

    #[test]
    fn ignores_plugin_actors() {
        assert!(respond(&say_event(2, "Echo: hello")).is_none());
    }

    #[test]
    fn ignores_empty_messages() {
        assert!(respond(&say_event(0, "")).is_none());
    }

    #[test]
    fn ignores_other_event_types() {
        let event = serde_json::json!({
            "stream": "location:01ABC",
            "type": "pose",
            "actor_kind": 0,
            "payload": "{}",
        })
        .to_string();
        assert!(respond(&event).is_none());
    }

    #[test]
    fn ignores_garbage_input() {
        assert!(respond("not json").is_none());
    }

    #[test]
    fn ignored_events_yield_empty_output() {
        // What handle_event returns for events the bot ignores: zero bytes,
        // which the host treats as "no emits".
        assert_eq!(respond(&say_event(2, "Echo: hello")).unwrap_or_default(), "");
    }
}
