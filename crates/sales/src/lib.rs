//! Sales Orders domain module.
//!
//! Order placement: validates a request against customers and the catalog, persists
//! an order with line prices frozen at purchase time and reserves the stock.

pub mod create_order;
pub mod order;
pub mod store;

pub use create_order::{DuplicateLinePolicy, OrderCreator, OrderError};
pub use order::{LineItem, Order, OrderLineRequest, OrderRequest};
pub use store::OrderStore;

#[cfg(test)]
mod testing;
