//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{Order, OrderId};
use crate::error::DomainError;

/// Repository for Order aggregates
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist an order and all of its items atomically.
    ///
    /// If `order.id` is `None` the storage layer assigns it, and it is written back into
    /// `order` once the write is committed. On error nothing from this call is visible.
    async fn create(&self, order: &mut Order) -> Result<(), DomainError>;

    /// Load an order with its items in insertion order.
    ///
    /// Returns `DomainError::NotFound` if no such order exists.
    async fn get_by_id(&self, id: &OrderId) -> Result<Order, DomainError>;
}
