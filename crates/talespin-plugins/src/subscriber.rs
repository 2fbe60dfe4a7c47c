//! Routes engine events to subscribed WASM plugins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use talespin_core::Event;
use talespin_events::Emitter;

use crate::abi::EmitEvent;
use crate::host::EventDelivery;

/// Default timeout for a single plugin event delivery.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes events to plugins by stream pattern.
///
/// Each matching plugin gets the event on its own task, bounded by the
/// delivery timeout. Whatever the plugin emits back is validated and
/// forwarded through the [`Emitter`]. Delivery failures are logged, never
/// propagated: one misbehaving plugin cannot take down event flow.
pub struct PluginSubscriber {
    delivery: Arc<dyn EventDelivery>,
    emitter: Arc<dyn Emitter>,
    delivery_timeout: Duration,
    /// plugin name -> stream patterns
    subscriptions: RwLock<HashMap<String, Vec<String>>>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl PluginSubscriber {
    /// Create a subscriber routing events from `delivery` back through
    /// `emitter`.
    #[must_use]
    pub fn new(delivery: Arc<dyn EventDelivery>, emitter: Arc<dyn Emitter>) -> Self {
        Self {
            delivery,
            emitter,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            subscriptions: RwLock::new(HashMap::new()),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the timeout for a single plugin event delivery.
    #[must_use]
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Register a plugin to receive events matching the stream pattern.
    ///
    /// Empty plugin names or patterns are ignored with a warning.
    /// Subscribing a plugin that is not loaded yet is allowed (lazy
    /// loading) and logged at debug level.
    pub fn subscribe(&self, plugin_name: &str, stream_pattern: &str) {
        if plugin_name.is_empty() {
            warn!("ignoring subscription with empty plugin name");
            return;
        }
        if stream_pattern.is_empty() {
            warn!(plugin = %plugin_name, "ignoring subscription with empty pattern");
            return;
        }
        if !self.delivery.has_plugin(plugin_name) {
            debug!(plugin = %plugin_name, "subscribing plugin not yet loaded");
        }
        if let Ok(mut subs) = self.subscriptions.write() {
            subs.entry(plugin_name.to_string())
                .or_default()
                .push(stream_pattern.to_string());
        }
    }

    /// Number of registered stream patterns across all plugins.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .read()
            .map_or(0, |subs| subs.values().map(Vec::len).sum())
    }

    /// Deliver an event to all subscribed plugins.
    ///
    /// Spawns one delivery task per matching plugin; must be called inside
    /// a tokio runtime. After [`stop`](Self::stop) the event is dropped
    /// with a warning and no tasks are spawned.
    pub fn handle_event(&self, event: &Event) {
        let Ok(subs) = self.subscriptions.read() else {
            return;
        };

        for (plugin_name, patterns) in subs.iter() {
            if !patterns.iter().any(|p| matches_pattern(&event.stream, p)) {
                continue;
            }

            if self.cancel.is_cancelled() {
                warn!(
                    event_id = %event.id,
                    event_stream = %event.stream,
                    event_type = %event.event_type,
                    "dropping event due to shutdown"
                );
                return;
            }

            self.tracker.spawn(deliver_with_timeout(
                Arc::clone(&self.delivery),
                Arc::clone(&self.emitter),
                plugin_name.clone(),
                event.clone(),
                self.delivery_timeout,
            ));
        }
    }

    /// Stop the subscriber and wait for in-flight deliveries to finish.
    ///
    /// Deliveries already in flight complete normally, including forwarding
    /// their emits; only events arriving after the stop are dropped.
    pub async fn stop(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl std::fmt::Debug for PluginSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSubscriber")
            .field("subscription_count", &self.subscription_count())
            .field("delivery_timeout", &self.delivery_timeout)
            .field("stopped", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Glob matching for stream patterns: `location:*` matches
/// `location:anything`, everything else is exact.
fn matches_pattern(stream: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => stream.starts_with(prefix),
        None => stream == pattern,
    }
}

/// A plugin-emitted stream name must be non-empty.
fn valid_emit_stream(stream: &str) -> bool {
    !stream.is_empty()
}

/// Deliver one event to one plugin and forward its validated emits.
///
/// Runs as a fire-and-forget task: there is no caller to return errors to,
/// so every failure is logged with context and the task either bails out
/// (delivery failures) or keeps going (per-emit failures).
async fn deliver_with_timeout(
    delivery: Arc<dyn EventDelivery>,
    emitter: Arc<dyn Emitter>,
    plugin_name: String,
    event: Event,
    timeout: Duration,
) {
    let emitted =
        match tokio::time::timeout(timeout, delivery.deliver_event(&plugin_name, &event)).await {
            Err(_) => {
                error!(
                    plugin = %plugin_name,
                    event_id = %event.id,
                    event_stream = %event.stream,
                    event_type = %event.event_type,
                    timeout_ms = %timeout.as_millis(),
                    "plugin event delivery timed out"
                );
                return;
            },
            Ok(Err(e)) => {
                error!(
                    plugin = %plugin_name,
                    event_id = %event.id,
                    event_stream = %event.stream,
                    event_type = %event.event_type,
                    error = %e,
                    "plugin event delivery failed"
                );
                return;
            },
            Ok(Ok(emitted)) => emitted,
        };

    let total = emitted.len();
    let mut failures: usize = 0;
    for (index, emit) in emitted.into_iter().enumerate() {
        if !valid_emit_stream(&emit.stream) {
            warn!(
                plugin = %plugin_name,
                emit_index = index,
                emit_count = total,
                emitted_type = %emit.event_type,
                "rejected plugin emit: empty stream name"
            );
            failures = failures.saturating_add(1);
            continue;
        }

        if let Err(e) = forward_emit(emitter.as_ref(), emit).await {
            error!(
                plugin = %plugin_name,
                emit_index = index,
                emit_count = total,
                error = %e,
                "failed to emit plugin event"
            );
            failures = failures.saturating_add(1);
        }
    }

    if failures > 0 {
        warn!(
            plugin = %plugin_name,
            failed = failures,
            total,
            "plugin emit batch had failures"
        );
    }
}

async fn forward_emit(
    emitter: &dyn Emitter,
    emit: EmitEvent,
) -> Result<(), talespin_events::EmitError> {
    emitter
        .emit(&emit.stream, emit.event_type, emit.payload.into_bytes())
        .await
}
