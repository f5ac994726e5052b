//! Unified error types for the Orders API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business errors (validation, not found, persistence)
//! - `ConfigError`: Process configuration errors
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Boxed underlying cause of a persistence failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Input field a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    UserId,
    Items,
    ProductId,
    Quantity,
    Price,
    Total,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::UserId => write!(f, "user_id"),
            Field::Items => write!(f, "items"),
            Field::ProductId => write!(f, "product_id"),
            Field::Quantity => write!(f, "quantity"),
            Field::Price => write!(f, "price"),
            Field::Total => write!(f, "total"),
        }
    }
}

/// Caller input that violates an order invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub field: Field,
    /// Position of the offending line item, for item-level failures
    pub item_index: Option<usize>,
    pub reason: &'static str,
}

impl ValidationError {
    pub fn new(field: Field, reason: &'static str) -> Self {
        Self {
            field,
            item_index: None,
            reason,
        }
    }

    pub fn for_item(index: usize, field: Field, reason: &'static str) -> Self {
        Self {
            field,
            item_index: Some(index),
            reason,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_index {
            Some(index) => write!(f, "items[{}].{}: {}", index, self.field, self.reason),
            None => write!(f, "{}: {}", self.field, self.reason),
        }
    }
}

/// Storage step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    BeginTransaction,
    InsertOrder,
    InsertItem { index: usize },
    CommitTransaction,
    RollbackTransaction,
    SelectOrder,
    SelectItems,
    DecodeOrder,
}

impl fmt::Display for PersistenceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceOp::BeginTransaction => write!(f, "begin transaction"),
            PersistenceOp::InsertOrder => write!(f, "insert order"),
            PersistenceOp::InsertItem { index } => write!(f, "insert item {}", index),
            PersistenceOp::CommitTransaction => write!(f, "commit transaction"),
            PersistenceOp::RollbackTransaction => write!(f, "rollback transaction"),
            PersistenceOp::SelectOrder => write!(f, "select order"),
            PersistenceOp::SelectItems => write!(f, "select items"),
            PersistenceOp::DecodeOrder => write!(f, "decode order"),
        }
    }
}

/// Domain layer errors
///
/// A closed set of kinds: boundary layers match on the variant, never on the message.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Persistence error during {operation}: {source}")]
    Persistence {
        operation: PersistenceOp,
        #[source]
        source: BoxError,
    },
}

impl DomainError {
    pub fn persistence(operation: PersistenceOp, source: impl Into<BoxError>) -> Self {
        DomainError::Persistence {
            operation,
            source: source.into(),
        }
    }
}

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_index: Option<usize>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Domain(DomainError::Validation(e)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Validation error".to_string(),
                    details: Some(e.reason.to_string()),
                    field: Some(e.field),
                    item_index: e.item_index,
                },
            ),
            AppError::Domain(DomainError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not found".to_string(),
                    details: Some(format!("order {} not found", id)),
                    field: None,
                    item_index: None,
                },
            ),
            AppError::Domain(e @ DomainError::Persistence { .. }) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".to_string(),
                        details: None,
                        field: None,
                        item_index: None,
                    },
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad request".to_string(),
                    details: Some(msg.clone()),
                    field: None,
                    item_index: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
