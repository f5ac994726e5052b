//! Order handlers
//!
//! Endpoints for placing and reading orders.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Order, OrderItem, OrderStatus};
use crate::error::AppError;
use crate::AppState;

/// Request body for order creation
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    pub product_id: String,
    pub quantity: i32,
    /// Unit price in minor currency units
    pub price: i64,
}

impl From<CreateOrderItem> for OrderItem {
    fn from(item: CreateOrderItem) -> Self {
        OrderItem::new(item.product_id, item.quantity, item.price)
    }
}

/// Response body for order creation
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub id: Option<String>,
    pub status: OrderStatus,
    pub total: i64,
}

/// Full order representation
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Option<String>,
    pub user_id: String,
    pub status: OrderStatus,
    pub total: i64,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id.map(|id| id.to_string()),
            user_id: order.user_id,
            status: order.status,
            total: order.total,
            items: order.items,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// POST /orders
///
/// Place a new order. Returns 201 with the id, status and total.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected order body");
        AppError::BadRequest("invalid request body".to_string())
    })?;

    let items = request.items.into_iter().map(OrderItem::from).collect();
    let order = state
        .order_service
        .create_order(&request.user_id, items)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            id: order.id.map(|id| id.to_string()),
            status: order.status,
            total: order.total,
        }),
    ))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.order_service.get_order(&id).await?;
    Ok(Json(order.into()))
}
