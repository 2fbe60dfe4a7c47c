//! Event bus and emitter seam for the Talespin engine.
//!
//! [`EventBus`] fans events out to stream subscribers over a broadcast
//! channel. [`Emitter`] is the write side: components that produce events
//! (command handlers, the plugin subscriber) go through it so the engine
//! controls actor attribution and delivery.

pub mod bus;
pub mod emitter;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};
pub use emitter::{BusEmitter, EmitError, Emitter};
