//! Shared domain building blocks for the storefront crates.
//!
//! Identifiers, money and the error types every other crate speaks. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{CustomerId, OrderId, ProductId};
pub use money::Price;
