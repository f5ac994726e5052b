//! Event sink port
//!
//! The order pipeline reports what it does through this trait instead of calling a
//! logging backend directly. Adapters decide where events go.

use crate::domain::entities::OrderId;
use crate::error::{PersistenceOp, ValidationError};

/// Something observable that happened while creating or loading an order
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// Caller input was rejected
    ValidationFailed {
        user_id: String,
        error: ValidationError,
    },
    /// A valid order is about to be persisted
    CreatingOrder {
        order_id: Option<OrderId>,
        user_id: String,
        total: i64,
    },
    OrderInserted {
        order_id: Option<OrderId>,
    },
    ItemsInserted {
        order_id: OrderId,
        count: usize,
    },
    TransactionCommitted {
        order_id: OrderId,
    },
    TransactionRolledBack {
        order_id: Option<OrderId>,
        operation: PersistenceOp,
    },
    PersistenceFailed {
        order_id: Option<OrderId>,
        operation: PersistenceOp,
        error: String,
    },
    OrderCreated {
        order_id: OrderId,
        total: i64,
    },
    OrderNotFound {
        id: String,
    },
    OrderLoaded {
        order_id: OrderId,
        item_count: usize,
    },
}

/// Receiver for order pipeline events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OrderEvent);
}
