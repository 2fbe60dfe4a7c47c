//! Extism-backed WASM plugin host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use extism::{Manifest, PluginBuilder, Wasm};
use tracing::{debug, info};

use talespin_core::Event;

use crate::abi::{EmitEvent, WireEvent, parse_response};
use crate::error::{PluginError, PluginResult};
use crate::loader::WasmHostConfig;

/// Delivery seam between the subscriber and the WASM runtime.
///
/// [`WasmHost`] is the production implementation; tests substitute fakes so
/// subscriber behavior can be exercised without compiled guests.
#[async_trait]
pub trait EventDelivery: Send + Sync {
    /// Whether a plugin with this name is currently loaded.
    fn has_plugin(&self, name: &str) -> bool;

    /// Deliver an event to a plugin and return the events it emitted.
    async fn deliver_event(&self, plugin_name: &str, event: &Event)
    -> PluginResult<Vec<EmitEvent>>;
}

/// The guest export every event-handling plugin implements.
const HANDLE_EVENT_EXPORT: &str = "handle_event";

struct HostInner {
    plugins: HashMap<String, Arc<Mutex<extism::Plugin>>>,
    closed: bool,
}

/// Registry of loaded Extism WASM plugins.
///
/// Plugins are loaded from raw WASM bytes under a name, then receive events
/// via [`EventDelivery::deliver_event`]. Each guest call runs on the
/// blocking thread pool with the per-call timeout and memory cap from
/// [`WasmHostConfig`] enforced by Extism.
pub struct WasmHost {
    config: WasmHostConfig,
    inner: RwLock<HostInner>,
}

impl WasmHost {
    pub(crate) fn new(config: WasmHostConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(HostInner {
                plugins: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Load a WASM plugin under the given name.
    ///
    /// Replaces any plugin previously loaded under the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::HostClosed`] after [`close`](Self::close), or
    /// [`PluginError::LoadFailed`] when the module does not compile.
    pub fn load_plugin(&self, name: &str, wasm_bytes: Vec<u8>) -> PluginResult<()> {
        let mut inner = self.write_lock()?;
        if inner.closed {
            return Err(PluginError::HostClosed);
        }

        let wasm_size = wasm_bytes.len();
        let manifest = Manifest::new([Wasm::data(wasm_bytes)])
            .with_timeout(self.config.call_timeout)
            .with_memory_max(self.config.max_memory_pages());

        let plugin = PluginBuilder::new(manifest)
            .with_wasi(self.config.wasi)
            .build()
            .map_err(|e| PluginError::LoadFailed {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        inner
            .plugins
            .insert(name.to_string(), Arc::new(Mutex::new(plugin)));

        info!(plugin = %name, wasm_size, "plugin loaded");
        Ok(())
    }

    /// Unload and drop all plugins. Idempotent.
    ///
    /// Deliveries already in flight keep their plugin alive until the guest
    /// call returns; new loads and deliveries fail with
    /// [`PluginError::HostClosed`].
    pub fn close(&self) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if inner.closed {
            return;
        }
        let count = inner.plugins.len();
        inner.plugins.clear();
        inner.closed = true;
        info!(plugin_count = count, "plugin host closed");
    }

    /// Number of loaded plugins.
    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.inner.read().map_or(0, |inner| inner.plugins.len())
    }

    fn write_lock(&self) -> PluginResult<std::sync::RwLockWriteGuard<'_, HostInner>> {
        self.inner
            .write()
            .map_err(|e| PluginError::Wasm(format!("host lock poisoned: {e}")))
    }

    fn get_plugin(&self, name: &str) -> PluginResult<Arc<Mutex<extism::Plugin>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| PluginError::Wasm(format!("host lock poisoned: {e}")))?;
        if inner.closed {
            return Err(PluginError::HostClosed);
        }
        inner
            .plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }
}

#[async_trait]
impl EventDelivery for WasmHost {
    fn has_plugin(&self, name: &str) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| !inner.closed && inner.plugins.contains_key(name))
    }

    async fn deliver_event(
        &self,
        plugin_name: &str,
        event: &Event,
    ) -> PluginResult<Vec<EmitEvent>> {
        let plugin = self.get_plugin(plugin_name)?;
        let input = serde_json::to_vec(&WireEvent::from_event(event))?;
        let name = plugin_name.to_string();

        // Guest calls are synchronous; run them off the async worker threads.
        let output = tokio::task::spawn_blocking(move || -> PluginResult<Option<Vec<u8>>> {
            let mut guard = plugin
                .lock()
                .map_err(|e| PluginError::Wasm(format!("plugin lock poisoned: {e}")))?;

            if !guard.function_exists(HANDLE_EVENT_EXPORT) {
                // Plugin doesn't handle events - not an error
                debug!(plugin = %name, "plugin has no handle_event export");
                return Ok(None);
            }

            let output: Vec<u8> = guard
                .call(HANDLE_EVENT_EXPORT, input)
                .map_err(|e| PluginError::Wasm(format!("plugin call failed: {e}")))?;
            Ok(Some(output))
        })
        .await
        .map_err(|e| PluginError::Wasm(format!("delivery task failed: {e}")))??;

        match output {
            None => Ok(Vec::new()),
            Some(bytes) => parse_response(&bytes),
        }
    }
}

impl std::fmt::Debug for WasmHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (count, closed) = self
            .inner
            .read()
            .map_or((0, true), |inner| (inner.plugins.len(), inner.closed));
        f.debug_struct("WasmHost")
            .field("plugin_count", &count)
            .field("closed", &closed)
            .field("config", &self.config)
            .finish()
    }
}
