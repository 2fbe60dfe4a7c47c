//! Emitter seam for publishing events back into the engine.

use async_trait::async_trait;

use talespin_core::{Actor, Event, EventType};

use crate::bus::EventBus;

/// Error emitting an event.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The emit target has shut down.
    #[error("emitter closed")]
    Closed,

    /// The emit was rejected by the receiving side.
    #[error("emit rejected: {0}")]
    Rejected(String),
}

/// The write side of the event system.
///
/// Components that produce events go through an `Emitter` rather than the
/// bus directly so the engine controls actor attribution. The plugin
/// subscriber forwards validated plugin emits through this trait.
#[async_trait]
pub trait Emitter: Send + Sync {
    /// Publish an event with the given stream, type, and JSON payload.
    async fn emit(
        &self,
        stream: &str,
        event_type: EventType,
        payload: Vec<u8>,
    ) -> Result<(), EmitError>;
}

/// An [`Emitter`] that stamps a fixed actor and publishes to an [`EventBus`].
#[derive(Debug, Clone)]
pub struct BusEmitter {
    bus: EventBus,
    actor: Actor,
}

impl BusEmitter {
    /// Create an emitter that publishes events attributed to `actor`.
    #[must_use]
    pub fn new(bus: EventBus, actor: Actor) -> Self {
        Self { bus, actor }
    }
}

#[async_trait]
impl Emitter for BusEmitter {
    async fn emit(
        &self,
        stream: &str,
        event_type: EventType,
        payload: Vec<u8>,
    ) -> Result<(), EmitError> {
        let event = Event::new(stream, event_type, self.actor.clone(), payload);
        self.bus.publish(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talespin_core::ActorKind;

    #[tokio::test]
    async fn bus_emitter_stamps_actor() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        let emitter = BusEmitter::new(bus.clone(), Actor::plugin("echo"));

        emitter
            .emit("location:01ABC", EventType::Say, b"{}".to_vec())
            .await
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.actor.kind, ActorKind::Plugin);
        assert_eq!(event.actor.id, "echo");
        assert_eq!(event.stream, "location:01ABC");
    }
}
