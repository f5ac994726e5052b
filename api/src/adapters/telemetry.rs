//! Event sink adapters
//!
//! `TracingEventSink` turns order pipeline events into `tracing` events.
//! `NoopEventSink` drops them; tests only.

use crate::domain::ports::{EventSink, OrderEvent};

/// Emits order events through `tracing`, tagged with the emitting component
pub struct TracingEventSink {
    component: &'static str,
}

impl TracingEventSink {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: OrderEvent) {
        let component = self.component;
        match event {
            OrderEvent::ValidationFailed { user_id, error } => {
                tracing::warn!(component, %user_id, %error, "invalid order");
            }
            OrderEvent::CreatingOrder {
                order_id,
                user_id,
                total,
            } => {
                tracing::debug!(component, order_id = ?order_id, %user_id, total, "creating order");
            }
            OrderEvent::OrderInserted { order_id } => {
                tracing::debug!(component, order_id = ?order_id, "order inserted");
            }
            OrderEvent::ItemsInserted { order_id, count } => {
                tracing::debug!(component, %order_id, items_count = count, "order items inserted");
            }
            OrderEvent::TransactionCommitted { order_id } => {
                tracing::info!(component, %order_id, "order transaction committed");
            }
            OrderEvent::TransactionRolledBack {
                order_id,
                operation,
            } => {
                tracing::warn!(component, order_id = ?order_id, %operation, "rolled back transaction");
            }
            OrderEvent::PersistenceFailed {
                order_id,
                operation,
                error,
            } => {
                tracing::error!(component, order_id = ?order_id, %operation, %error, "persistence failure");
            }
            OrderEvent::OrderCreated { order_id, total } => {
                tracing::info!(component, %order_id, total, "order created");
            }
            OrderEvent::OrderNotFound { id } => {
                tracing::warn!(component, order_id = %id, "order not found");
            }
            OrderEvent::OrderLoaded {
                order_id,
                item_count,
            } => {
                tracing::debug!(component, %order_id, items_count = item_count, "order loaded with items");
            }
        }
    }
}

/// Event sink that discards everything
#[cfg(test)]
pub struct NoopEventSink;

#[cfg(test)]
impl EventSink for NoopEventSink {
    fn emit(&self, _event: OrderEvent) {}
}
