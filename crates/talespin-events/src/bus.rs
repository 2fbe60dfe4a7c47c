//! Event bus for broadcasting events to stream subscribers.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use talespin_core::Event;

/// Default channel capacity for the event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Event bus for broadcasting events to all subscribers.
///
/// The bus uses a broadcast channel to deliver `Arc<Event>`s to all
/// connected receivers, in publish order. Receivers that fall behind the
/// channel capacity lose events and are told how many were dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<Event>>,
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of receivers the event was delivered to.
    pub fn publish(&self, event: Event) -> usize {
        let event = Arc::new(event);
        trace!(stream = %event.stream, event_type = %event.event_type, "publishing event");

        match self.sender.send(Arc::clone(&event)) {
            Ok(count) => {
                debug!(
                    stream = %event.stream,
                    event_type = %event.event_type,
                    receiver_count = count,
                    "event published"
                );
                count
            },
            Err(_) => {
                // No receivers - this is fine
                trace!(stream = %event.stream, "no receivers for event");
                0
            },
        }
    }

    /// Subscribe to all events.
    #[must_use]
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), None)
    }

    /// Subscribe to events on streams matching a pattern.
    ///
    /// The pattern is either an exact stream name (`location:01ABC`) or a
    /// trailing-`*` prefix glob (`location:*`).
    #[must_use]
    pub fn subscribe_stream(&self, pattern: impl Into<String>) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe(), Some(pattern.into()))
    }

    /// Number of currently attached receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for events from the event bus.
pub struct EventReceiver {
    receiver: broadcast::Receiver<Arc<Event>>,
    /// Optional stream pattern. When set, only events whose stream matches
    /// are yielded.
    pattern: Option<String>,
}

impl EventReceiver {
    pub(crate) fn new(receiver: broadcast::Receiver<Arc<Event>>, pattern: Option<String>) -> Self {
        Self { receiver, pattern }
    }

    fn matches(&self, event: &Event) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => match pattern.strip_suffix('*') {
                Some(prefix) => event.stream.starts_with(prefix),
                None => event.stream == *pattern,
            },
        }
    }

    /// Receive the next matching event.
    ///
    /// Returns `None` once the bus is dropped. Lagged receivers skip the
    /// dropped events and keep going.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(event);
                    }
                },
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "event receiver lagged, events dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive the next matching event without blocking.
    pub fn try_recv(&mut self) -> Option<Arc<Event>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(event);
                    }
                },
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(skipped = count, "event receiver lagged, events dropped");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
