//! Order persistence boundary.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{OrderId, StoreError};
use storefront_parties::Customer;

use crate::order::{LineItem, Order};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order for `customer`, assigning its id and creation time.
    async fn create(&self, customer: &Customer, items: Vec<LineItem>) -> Result<Order, StoreError>;

    /// Remove an order created earlier in the same placement (compensation only).
    async fn discard(&self, order_id: OrderId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn create(&self, customer: &Customer, items: Vec<LineItem>) -> Result<Order, StoreError> {
        (**self).create(customer, items).await
    }

    async fn discard(&self, order_id: OrderId) -> Result<(), StoreError> {
        (**self).discard(order_id).await
    }
}
