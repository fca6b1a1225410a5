//! Domain and store error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures raised while building domain values
/// (validation, malformed identifiers). Store failures are reported with [`StoreError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Failure reported by a customer, product or order store.
///
/// These are the only errors a store implementation may return. Services wrap them in
/// their own error enums so callers can tell a broken backend apart from a rejected
/// request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record addressed by a mutation does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A conditional stock decrement was refused.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// A stock decrement that is not a positive amount, or whose per-product total
    /// does not fit an `i64`.
    #[error("invalid stock decrement for product {product_id}: {quantity}")]
    InvalidDelta { product_id: ProductId, quantity: i64 },

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other backend failure (connection, serialization, poisoned lock, ...).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
