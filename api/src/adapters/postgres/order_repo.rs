//! PostgreSQL adapter for OrderRepository

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::entities::{Order, OrderId, OrderItem, OrderStatus};
use crate::domain::ports::{EventSink, OrderEvent, OrderRepository};
use crate::entity::{order_items, orders};
use crate::error::{BoxError, DomainError, PersistenceOp};

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    db: Arc<DatabaseConnection>,
    events: Arc<dyn EventSink>,
}

impl PostgresOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>, events: Arc<dyn EventSink>) -> Self {
        Self { db, events }
    }

    fn failure(
        &self,
        order_id: Option<OrderId>,
        operation: PersistenceOp,
        err: impl Into<BoxError> + Display,
    ) -> DomainError {
        self.events.emit(OrderEvent::PersistenceFailed {
            order_id,
            operation,
            error: err.to_string(),
        });
        DomainError::persistence(operation, err)
    }

    /// Insert the order row and then each item row, returning the stored order id
    async fn insert_aggregate(
        &self,
        txn: &DatabaseTransaction,
        order: &Order,
    ) -> Result<OrderId, (PersistenceOp, DbErr)> {
        let row = orders::ActiveModel {
            // Unassigned ids fall back to the column default and come back via RETURNING
            id: order.id.map_or(NotSet, |id| Set(id.0)),
            user_id: Set(order.user_id.clone()),
            status: Set(order.status.to_string()),
            total: Set(order.total),
            created_at: Set(order.created_at.fixed_offset()),
            updated_at: Set(order.updated_at.fixed_offset()),
        }
        .insert(txn)
        .await
        .map_err(|e| (PersistenceOp::InsertOrder, e))?;

        let order_id = OrderId(row.id);
        self.events.emit(OrderEvent::OrderInserted {
            order_id: Some(order_id),
        });

        for (index, item) in order.items.iter().enumerate() {
            order_items::ActiveModel {
                id: NotSet,
                order_id: Set(row.id),
                product_id: Set(item.product_id.clone()),
                quantity: Set(item.quantity),
                price: Set(item.price),
            }
            .insert(txn)
            .await
            .map_err(|e| (PersistenceOp::InsertItem { index }, e))?;
        }

        self.events.emit(OrderEvent::ItemsInserted {
            order_id,
            count: order.items.len(),
        });

        Ok(order_id)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &mut Order) -> Result<(), DomainError> {
        // Dropping `txn` without commit rolls it back. That includes this future being
        // dropped at any await below, so a cancelled create never commits.
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| self.failure(order.id, PersistenceOp::BeginTransaction, e))?;

        let order_id = match self.insert_aggregate(&txn, order).await {
            Ok(order_id) => order_id,
            Err((operation, err)) => {
                let failure = self.failure(order.id, operation, err);
                if let Err(e) = txn.rollback().await {
                    self.events.emit(OrderEvent::PersistenceFailed {
                        order_id: order.id,
                        operation: PersistenceOp::RollbackTransaction,
                        error: e.to_string(),
                    });
                }
                self.events.emit(OrderEvent::TransactionRolledBack {
                    order_id: order.id,
                    operation,
                });
                return Err(failure);
            }
        };

        txn.commit()
            .await
            .map_err(|e| self.failure(Some(order_id), PersistenceOp::CommitTransaction, e))?;

        self.events
            .emit(OrderEvent::TransactionCommitted { order_id });

        order.id = Some(order_id);
        Ok(())
    }

    async fn get_by_id(&self, id: &OrderId) -> Result<Order, DomainError> {
        let row = orders::Entity::find_by_id(id.0)
            .one(&*self.db)
            .await
            .map_err(|e| self.failure(Some(*id), PersistenceOp::SelectOrder, e))?;

        let Some(row) = row else {
            self.events.emit(OrderEvent::OrderNotFound { id: id.to_string() });
            return Err(DomainError::NotFound(id.to_string()));
        };

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(id.0))
            .order_by_asc(order_items::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| self.failure(Some(*id), PersistenceOp::SelectItems, e))?;

        let order = into_order(row, items)
            .map_err(|e| self.failure(Some(*id), PersistenceOp::DecodeOrder, e))?;

        self.events.emit(OrderEvent::OrderLoaded {
            order_id: *id,
            item_count: order.items.len(),
        });

        Ok(order)
    }
}

/// Convert SeaORM models to the domain aggregate
fn into_order(row: orders::Model, items: Vec<order_items::Model>) -> Result<Order, String> {
    let status: OrderStatus = row.status.parse()?;

    Ok(Order {
        id: Some(OrderId(row.id)),
        user_id: row.user_id,
        items: items.into_iter().map(OrderItem::from).collect(),
        status,
        total: row.total,
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
    })
}

/// Convert SeaORM model to domain entity
impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
        }
    }
}
