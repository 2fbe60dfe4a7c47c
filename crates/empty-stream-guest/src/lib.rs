//! Empty-stream WASM guest.
//!
//! Mirrors the echo guest's gating (only `say` events from non-plugin
//! actors) but always emits its response with an empty stream name. The
//! host's subscriber must reject the emit during stream validation, so
//! nothing this guest produces may ever reach the event bus. Testing only.

use extism_pdk::*;
use serde::{Deserialize, Serialize};

/// Actor kind tag for plugin-originated events.
const ACTOR_KIND_PLUGIN: u8 = 2;

#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    actor_kind: u8,
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

#[derive(Serialize)]
struct SayPayload {
    message: String,
}

/// Build the invalid response for events the guest reacts to.
fn respond(event_json: &str) -> Option<String> {
    let event: WireEvent = serde_json::from_str(event_json).ok()?;

    if event.event_type != "say" {
        return None;
    }
    if event.actor_kind == ACTOR_KIND_PLUGIN {
        return None;
    }

    let payload = serde_json::to_string(&SayPayload {
        message: "This should be rejected".to_string(),
    })
    .ok()?;

    serde_json::to_string(&Response {
        events: vec![EmitEvent {
            // Empty stream - the host validator must reject this emit.
            stream: String::new(),
            event_type: "say".to_string(),
            payload,
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
