use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{CustomerId, Entity, OrderId, Price, ProductId};

/// One requested line: `quantity` units of `product_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    /// Signed so that zero and negative input can be rejected instead of being
    /// unrepresentable at the boundary.
    pub quantity: i64,
}

impl OrderLineRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Input of the order placement workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub products: Vec<OrderLineRequest>,
}

impl OrderRequest {
    pub fn new(customer_id: CustomerId, products: Vec<OrderLineRequest>) -> Self {
        Self {
            customer_id,
            products,
        }
    }
}

/// Order line with the unit price copied from the catalog when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub price: Price,
    pub quantity: i64,
}

impl LineItem {
    /// `price × quantity`.
    pub fn subtotal(&self) -> Decimal {
        self.price
            .checked_mul(self.quantity)
            .unwrap_or(Decimal::MAX)
    }
}

/// A persisted order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.subtotal()))
    }

    pub fn item_for(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
