use async_trait::async_trait;
use chrono::Utc;

use storefront_core::{OrderId, StoreError};
use storefront_parties::Customer;
use storefront_sales::{LineItem, Order, OrderStore};

use super::table::InMemoryTable;

/// In-memory order book.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    table: InMemoryTable<Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.table.get(&id)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.table.len()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.table.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, customer: &Customer, items: Vec<LineItem>) -> Result<Order, StoreError> {
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            items,
            created_at: Utc::now(),
        };
        self.table.upsert(order.clone())?;
        Ok(order)
    }

    async fn discard(&self, order_id: OrderId) -> Result<(), StoreError> {
        self.table
            .remove(&order_id)?
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("order {order_id}")))
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::{CustomerId, Price, ProductId};

    use super::*;

    #[tokio::test]
    async fn create_assigns_identity_and_discard_removes() {
        let store = InMemoryOrderStore::new();
        let customer = Customer::new(CustomerId::new(), "C1");
        let items = vec![LineItem {
            product_id: ProductId::new(),
            price: Price::from_cents(1000),
            quantity: 3,
        }];

        let order = store.create(&customer, items.clone()).await.unwrap();
        assert_eq!(order.customer_id, customer.id);
        assert_eq!(order.items, items);
        assert_eq!(store.get(order.id).unwrap(), Some(order.clone()));

        store.discard(order.id).await.unwrap();
        assert!(store.is_empty().unwrap());
        assert!(matches!(
            store.discard(order.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
