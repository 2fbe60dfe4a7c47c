//! Extism WASM plugin host and event subscriber for the Talespin engine.
//!
//! Plugins are WASM modules that export a `handle_event` function. The host
//! serializes each engine [`Event`](talespin_core::Event) to the JSON wire
//! shape in [`abi`], calls the guest, and parses zero or more emitted events
//! out of the response. [`PluginSubscriber`] sits between the engine's event
//! flow and the host: it routes events to plugins by stream pattern, bounds
//! each delivery with a timeout, validates what plugins emit, and forwards
//! the survivors through the engine's
//! [`Emitter`](talespin_events::Emitter) seam.
//!
//! # Blocking
//!
//! Extism guest calls are synchronous. [`WasmHost::deliver_event`] moves the
//! call onto the blocking thread pool, so it must run inside a tokio
//! runtime.

pub mod abi;
pub mod error;
pub mod host;
pub mod loader;
pub mod subscriber;

pub use abi::{EmitEvent, Response, WireEvent, parse_response};
pub use error::{PluginError, PluginResult};
pub use host::{EventDelivery, WasmHost};
pub use loader::WasmHostBuilder;
pub use subscriber::PluginSubscriber;
