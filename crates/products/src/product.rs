use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use storefront_core::{Entity, Price, ProductId, StoreError};

/// Catalog product with its current stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unique across the catalog.
    pub name: String,
    pub price: Price,
    /// Units available. Stores never let this go below zero through a decrement.
    pub quantity: i64,
}

impl Product {
    /// Whether `requested` units can be taken from the current stock.
    pub fn has_stock_for(&self, requested: i64) -> bool {
        requested <= self.quantity
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Attributes of a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub quantity: i64,
}

/// One entry of a stock decrement request: take `quantity` units of `product_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl StockDelta {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// Collapse repeated products into one delta each, keeping first-seen order.
    ///
    /// Fails with `StoreError::InvalidDelta` on a non-positive entry or when a
    /// product's total overflows.
    pub fn sum_by_product(deltas: &[StockDelta]) -> Result<Vec<StockDelta>, StoreError> {
        let mut summed: Vec<StockDelta> = Vec::with_capacity(deltas.len());
        let mut position: HashMap<ProductId, usize> = HashMap::with_capacity(deltas.len());
        for d in deltas {
            let invalid = || StoreError::InvalidDelta {
                product_id: d.product_id,
                quantity: d.quantity,
            };
            if d.quantity <= 0 {
                return Err(invalid());
            }
            match position.get(&d.product_id) {
                Some(&idx) => {
                    let total = &mut summed[idx].quantity;
                    *total = total.checked_add(d.quantity).ok_or_else(invalid)?;
                }
                None => {
                    position.insert(d.product_id, summed.len());
                    summed.push(*d);
                }
            }
        }
        Ok(summed)
    }
}
