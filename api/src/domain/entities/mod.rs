//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod order;

pub use order::{IdAssignment, Order, OrderId, OrderItem, OrderStatus};
