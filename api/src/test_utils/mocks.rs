//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::entities::{Order, OrderId};
use crate::domain::ports::{EventSink, OrderEvent, OrderRepository};
use crate::error::{DomainError, PersistenceOp};

// ============================================================================
// In-Memory Order Repository
// ============================================================================

/// Order repository that stages writes and publishes them only at "commit"
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    /// Step that fails with an injected error
    fail_at: Option<PersistenceOp>,
    /// Never reach commit; lets tests drop the future mid-transaction
    stall_before_commit: bool,
    create_calls: AtomicUsize,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given step of `create`
    pub fn failing_at(mut self, operation: PersistenceOp) -> Self {
        self.fail_at = Some(operation);
        self
    }

    pub fn stalling_before_commit(mut self) -> Self {
        self.stall_before_commit = true;
        self
    }

    /// Pre-populate with an order for testing
    pub fn with_order(self, order: Order) -> Self {
        {
            let mut orders = self.orders.write().unwrap();
            let id = order.id.expect("stored orders need an id");
            orders.insert(id, order);
        }
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }

    fn step(&self, operation: PersistenceOp) -> Result<(), DomainError> {
        if self.fail_at == Some(operation) {
            return Err(DomainError::persistence(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &mut Order) -> Result<(), DomainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        self.step(PersistenceOp::BeginTransaction)?;
        self.step(PersistenceOp::InsertOrder)?;
        let id = order.id.unwrap_or_default();
        let mut staged = order.clone();
        staged.id = Some(id);

        for index in 0..order.items.len() {
            self.step(PersistenceOp::InsertItem { index })?;
        }

        if self.stall_before_commit {
            std::future::pending::<()>().await;
        }
        self.step(PersistenceOp::CommitTransaction)?;

        self.orders.write().unwrap().insert(id, staged);
        order.id = Some(id);
        Ok(())
    }

    async fn get_by_id(&self, id: &OrderId) -> Result<Order, DomainError> {
        let orders = self.orders.read().unwrap();
        orders
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }
}

// ============================================================================
// Recording Event Sink
// ============================================================================

/// Event sink that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<OrderEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &OrderEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: OrderEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_order;

    #[tokio::test]
    async fn failed_step_publishes_nothing() {
        let repo = InMemoryOrderRepository::new().failing_at(PersistenceOp::CommitTransaction);
        let mut order = test_order();

        assert!(repo.create(&mut order).await.is_err());
        assert!(repo.is_empty());
        assert_eq!(repo.create_calls(), 1);
    }

    #[tokio::test]
    async fn with_order_is_readable() {
        let order = test_order();
        let repo = InMemoryOrderRepository::new().with_order(order.clone());

        let loaded = repo.get_by_id(&order.id.unwrap()).await.unwrap();
        assert_eq!(loaded, order);
    }
}
