//! Order domain entity
//!
//! An order placed by a user, together with its line items. `Order::new` is the only
//! place an order is assembled from caller input: it validates every invariant and
//! computes the total once.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Field, ValidationError};

/// Unique identifier for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Who assigns order identifiers
///
/// Fixed per process. `Constructor` keeps `Order::new` self-contained; `Storage` leaves
/// the identifier empty and lets the database default fill it on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAssignment {
    #[default]
    Constructor,
    Storage,
}

impl std::fmt::Display for IdAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdAssignment::Constructor => write!(f, "constructor"),
            IdAssignment::Storage => write!(f, "storage"),
        }
    }
}

impl std::str::FromStr for IdAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constructor" => Ok(IdAssignment::Constructor),
            "storage" => Ok(IdAssignment::Storage),
            _ => Err(format!("Unknown id assignment: {}", s)),
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// A single line of an order. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub price: i64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i32, price: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    /// quantity × price, or `None` on overflow
    pub fn subtotal(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.price)
    }

    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.product_id.is_empty() {
            return Err(ValidationError::for_item(
                index,
                Field::ProductId,
                "product reference is required",
            ));
        }
        if self.quantity <= 0 {
            return Err(ValidationError::for_item(
                index,
                Field::Quantity,
                "quantity must be positive",
            ));
        }
        if self.price <= 0 {
            return Err(ValidationError::for_item(
                index,
                Field::Price,
                "price must be positive",
            ));
        }
        Ok(())
    }
}

/// An order aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    /// `None` only for a storage-assigned order that has not been persisted yet
    pub id: Option<OrderId>,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// Sum of quantity × price over `items`, in minor currency units
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Validate caller input and assemble a pending order.
    ///
    /// Checks run in a fixed order and the first violation wins:
    /// user reference, item list, then each item in list order
    /// (product reference, quantity, price), then the total's range.
    pub fn new(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        ids: IdAssignment,
    ) -> Result<Self, ValidationError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(ValidationError::new(
                Field::UserId,
                "user reference is required",
            ));
        }
        if items.is_empty() {
            return Err(ValidationError::new(
                Field::Items,
                "order must have at least one item",
            ));
        }
        for (index, item) in items.iter().enumerate() {
            item.validate(index)?;
        }

        let total = items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.subtotal()?))
            .ok_or_else(|| {
                ValidationError::new(Field::Total, "order total exceeds the supported range")
            })?;

        let id = match ids {
            IdAssignment::Constructor => Some(OrderId::new()),
            IdAssignment::Storage => None,
        };

        // TIMESTAMPTZ keeps microseconds
        let now = Utc::now().trunc_subsecs(6);

        Ok(Order {
            id,
            user_id,
            items,
            status: OrderStatus::Pending,
            total,
            created_at: now,
            updated_at: now,
        })
    }
}
