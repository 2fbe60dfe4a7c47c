//! Event types for the Talespin engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of event.
///
/// Known kinds get dedicated variants; anything else (plugins may emit novel
/// types) is preserved verbatim in [`EventType::Other`]. Serializes as a bare
/// JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// A character said something.
    Say,
    /// A character posed (emoted) an action.
    Pose,
    /// An entity arrived on a stream.
    Arrive,
    /// An entity left a stream.
    Leave,
    /// A system notification.
    System,
    /// Any event type not built into the engine.
    Other(String),
}

impl EventType {
    /// The string tag used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Say => "say",
            Self::Pose => "pose",
            Self::Arrive => "arrive",
            Self::Leave => "leave",
            Self::System => "system",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "say" => Self::Say,
            "pose" => Self::Pose,
            "arrive" => Self::Arrive,
            "leave" => Self::Leave,
            "system" => Self::System,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What type of entity caused an event.
///
/// Serializes as a JSON number (`0` character, `1` system, `2` plugin).
/// Unrecognized values survive round-trips via [`ActorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ActorKind {
    /// A player character.
    Character,
    /// The engine itself.
    System,
    /// A plugin-originated actor.
    Plugin,
    /// An actor kind this build does not recognize.
    Unknown(u8),
}

impl From<u8> for ActorKind {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Character,
            1 => Self::System,
            2 => Self::Plugin,
            other => Self::Unknown(other),
        }
    }
}

impl From<ActorKind> for u8 {
    fn from(k: ActorKind) -> Self {
        match k {
            ActorKind::Character => 0,
            ActorKind::System => 1,
            ActorKind::Plugin => 2,
            ActorKind::Unknown(v) => v,
        }
    }
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Character => "character",
            Self::System => "system",
            Self::Plugin => "plugin",
            Self::Unknown(_) => "unknown",
        };
        f.write_str(name)
    }
}

/// Who or what caused an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The kind of entity.
    pub kind: ActorKind,
    /// Character ID, plugin name, or `"system"`.
    pub id: String,
}

impl Actor {
    /// An actor for a player character.
    #[must_use]
    pub fn character(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Character,
            id: id.into(),
        }
    }

    /// The engine actor.
    #[must_use]
    pub fn system() -> Self {
        Self {
            kind: ActorKind::System,
            id: "system".to_string(),
        }
    }

    /// An actor for a plugin, identified by plugin name.
    #[must_use]
    pub fn plugin(name: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Plugin,
            id: name.into(),
        }
    }
}

/// Something that happened in the game world.
#[derive(Debug, Clone)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// Stream the event was published to, e.g. `location:01ABC`.
    pub stream: String,
    /// The kind of event.
    pub event_type: EventType,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
    /// Who caused the event.
    pub actor: Actor,
    /// Event body as JSON bytes.
    pub payload: Vec<u8>,
}

impl Event {
    /// Create an event stamped with a fresh ID and the current time.
    #[must_use]
    pub fn new(
        stream: impl Into<String>,
        event_type: EventType,
        actor: Actor,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stream: stream.into(),
            event_type,
            timestamp: Utc::now(),
            actor,
            payload,
        }
    }
}

/// Payload body of a `say` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SayPayload {
    /// What was said.
    pub message: String,
}

impl SayPayload {
    /// Create a say payload.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
