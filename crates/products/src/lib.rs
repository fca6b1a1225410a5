//! Products domain module (catalog).
//!
//! Defines the catalog entity, the product store boundary and the product creation
//! service. Stock is owned by the catalog; other modules request decrements through
//! [`ProductStore::update_quantity`].

pub mod create_product;
pub mod product;
pub mod store;

pub use create_product::{ProductCreator, ProductError};
pub use product::{NewProduct, Product, StockDelta};
pub use store::ProductStore;
