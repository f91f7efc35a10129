//! Generation lifecycle events and the in-process event bus.

pub mod bus;

pub use bus::{EventBus, GenerationEvent};
