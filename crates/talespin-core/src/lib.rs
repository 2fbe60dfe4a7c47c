//! Core event model for the Talespin engine.
//!
//! Everything that happens in the game world is an [`Event`] published to a
//! named stream (`location:<id>`, `char:<id>`, ...). Events carry an
//! [`Actor`] describing who caused them, which lets downstream consumers
//! (including plugins) distinguish character input from plugin output.

pub mod event;

pub use event::{Actor, ActorKind, Event, EventType, SayPayload};
