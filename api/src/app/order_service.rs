//! Order service
//!
//! Entry point for placing and reading orders. Builds the aggregate with
//! `Order::new`, hands it to the repository, and returns errors unchanged.

use std::sync::Arc;

use crate::domain::entities::{IdAssignment, Order, OrderId, OrderItem};
use crate::domain::ports::{EventSink, OrderEvent, OrderRepository};
use crate::error::{DomainError, Field, ValidationError};

/// Service for creating and loading orders
pub struct OrderService<OR>
where
    OR: OrderRepository,
{
    orders: Arc<OR>,
    events: Arc<dyn EventSink>,
    ids: IdAssignment,
}

impl<OR> OrderService<OR>
where
    OR: OrderRepository,
{
    pub fn new(orders: Arc<OR>, events: Arc<dyn EventSink>, ids: IdAssignment) -> Self {
        Self {
            orders,
            events,
            ids,
        }
    }

    /// Validate, build and persist a new order
    ///
    /// Validation errors from the constructor and persistence errors from the
    /// repository are returned as-is.
    pub async fn create_order(
        &self,
        user_id: &str,
        items: Vec<OrderItem>,
    ) -> Result<Order, DomainError> {
        // Invariant guard, independent of Order::new: an empty user reference never
        // reaches construction or storage.
        if user_id.is_empty() {
            let error = ValidationError::new(Field::UserId, "user reference is required");
            self.events.emit(OrderEvent::ValidationFailed {
                user_id: user_id.to_string(),
                error: error.clone(),
            });
            return Err(error.into());
        }

        let mut order = match Order::new(user_id, items, self.ids) {
            Ok(order) => order,
            Err(error) => {
                self.events.emit(OrderEvent::ValidationFailed {
                    user_id: user_id.to_string(),
                    error: error.clone(),
                });
                return Err(error.into());
            }
        };

        self.events.emit(OrderEvent::CreatingOrder {
            order_id: order.id,
            user_id: order.user_id.clone(),
            total: order.total,
        });

        self.orders.create(&mut order).await?;

        if let Some(order_id) = order.id {
            self.events.emit(OrderEvent::OrderCreated {
                order_id,
                total: order.total,
            });
        }

        Ok(order)
    }

    /// Load an order by its external identifier
    ///
    /// An identifier that is not a UUID cannot name a stored order, so it is
    /// reported as not found rather than as a bad request.
    pub async fn get_order(&self, id: &str) -> Result<Order, DomainError> {
        let Ok(order_id) = id.parse::<OrderId>() else {
            self.events.emit(OrderEvent::OrderNotFound { id: id.to_string() });
            return Err(DomainError::NotFound(id.to_string()));
        };

        self.orders.get_by_id(&order_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::domain::entities::OrderStatus;
    use crate::error::PersistenceOp;
    use crate::test_utils::{test_items, InMemoryOrderRepository, RecordingEventSink};

    fn service(
        repo: Arc<InMemoryOrderRepository>,
        ids: IdAssignment,
    ) -> (OrderService<InMemoryOrderRepository>, Arc<RecordingEventSink>) {
        let events = Arc::new(RecordingEventSink::new());
        (OrderService::new(repo, events.clone(), ids), events)
    }

    fn validation(err: DomainError) -> ValidationError {
        match err {
            DomainError::Validation(e) => e,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_order_returns_pending_order_with_total() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, events) = service(repo.clone(), IdAssignment::Constructor);

        let order = service
            .create_order(
                "u-1",
                vec![OrderItem::new("p-1", 2, 1500), OrderItem::new("p-2", 1, 500)],
            )
            .await
            .unwrap();

        assert_eq!(order.total, 3500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.status.to_string(), "pending");
        assert_eq!(repo.create_calls(), 1);
        assert!(events.contains(&OrderEvent::OrderCreated {
            order_id: order.id.unwrap(),
            total: 3500,
        }));
    }

    #[tokio::test]
    async fn created_order_round_trips() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, _) = service(repo, IdAssignment::Constructor);

        let created = service.create_order("u-1", test_items()).await.unwrap();
        let loaded = service
            .get_order(&created.id.unwrap().to_string())
            .await
            .unwrap();

        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn storage_assigned_id_is_filled_in() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, _) = service(repo, IdAssignment::Storage);

        let order = service.create_order("u-1", test_items()).await.unwrap();

        let id = order.id.expect("repository should assign an id");
        let loaded = assert_ok!(service.get_order(&id.to_string()).await);
        assert_eq!(loaded.id, Some(id));
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_before_storage() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, events) = service(repo.clone(), IdAssignment::Constructor);

        let err = service
            .create_order("", vec![OrderItem::new("p-1", 1, 100)])
            .await
            .unwrap_err();

        let err = validation(err);
        assert_eq!(err.field, Field::UserId);
        assert_eq!(err.reason, "user reference is required");
        assert_eq!(repo.create_calls(), 0);
        assert!(matches!(
            events.events().as_slice(),
            [OrderEvent::ValidationFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn whitespace_user_id_is_accepted() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, _) = service(repo.clone(), IdAssignment::Constructor);

        let order = assert_ok!(service.create_order(" ", test_items()).await);

        assert_eq!(order.user_id, " ");
        assert_eq!(repo.create_calls(), 1);
    }

    #[tokio::test]
    async fn constructor_validation_errors_pass_through_unchanged() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, _) = service(repo.clone(), IdAssignment::Constructor);

        let cases = vec![
            (vec![], Field::Items, None),
            (vec![OrderItem::new("", 1, 100)], Field::ProductId, Some(0)),
            (
                vec![OrderItem::new("p-1", 1, 100), OrderItem::new("p-2", 0, 100)],
                Field::Quantity,
                Some(1),
            ),
            (vec![OrderItem::new("p-1", 1, -5)], Field::Price, Some(0)),
        ];

        for (items, field, index) in cases {
            let expected = Order::new("u-1", items.clone(), IdAssignment::Constructor).unwrap_err();
            let err = validation(service.create_order("u-1", items).await.unwrap_err());

            assert_eq!(err, expected);
            assert_eq!(err.field, field);
            assert_eq!(err.item_index, index);
        }

        assert_eq!(repo.create_calls(), 0);
    }

    #[tokio::test]
    async fn persistence_errors_pass_through_unchanged() {
        let repo = Arc::new(
            InMemoryOrderRepository::new().failing_at(PersistenceOp::InsertItem { index: 1 }),
        );
        let (service, events) = service(repo.clone(), IdAssignment::Constructor);

        let err = service.create_order("u-1", test_items()).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Persistence {
                operation: PersistenceOp::InsertItem { index: 1 },
                ..
            }
        ));
        assert!(repo.is_empty());
        assert!(!events
            .events()
            .iter()
            .any(|e| matches!(e, OrderEvent::OrderCreated { .. })));
    }

    #[tokio::test]
    async fn failed_create_leaves_no_order_behind() {
        let repo = Arc::new(
            InMemoryOrderRepository::new().failing_at(PersistenceOp::InsertItem { index: 1 }),
        );
        let (service, events) = service(repo.clone(), IdAssignment::Constructor);

        assert_err!(service.create_order("u-1", test_items()).await);

        let attempted = events
            .events()
            .into_iter()
            .find_map(|e| match e {
                OrderEvent::CreatingOrder { order_id, .. } => order_id,
                _ => None,
            })
            .unwrap();
        let err = service
            .get_order(&attempted.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancelled_create_does_not_commit() {
        let repo = Arc::new(InMemoryOrderRepository::new().stalling_before_commit());
        let (service, _) = service(repo.clone(), IdAssignment::Constructor);

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            service.create_order("u-1", test_items()),
        )
        .await;

        assert!(result.is_err());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let (service, events) = service(repo, IdAssignment::Constructor);

        let err = service.get_order("does-not-exist").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref id) if id == "does-not-exist"));
        assert!(events.contains(&OrderEvent::OrderNotFound {
            id: "does-not-exist".to_string(),
        }));

        let err = service
            .get_order(&OrderId::new().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
