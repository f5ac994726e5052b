//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use crate::domain::entities::{IdAssignment, Order, OrderItem};

/// Two line items totalling 3500
pub fn test_items() -> Vec<OrderItem> {
    vec![OrderItem::new("p-1", 2, 1500), OrderItem::new("p-2", 1, 500)]
}

/// Create a test order with a constructor-assigned id
pub fn test_order() -> Order {
    test_order_for("user-1")
}

/// Create a test order for a specific user
pub fn test_order_for(user_id: &str) -> Order {
    Order::new(user_id, test_items(), IdAssignment::Constructor)
        .expect("fixture order should be valid")
}
