//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod events;
pub mod repositories;

pub use events::{EventSink, OrderEvent};
pub use repositories::OrderRepository;
