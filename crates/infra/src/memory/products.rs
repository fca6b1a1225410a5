use async_trait::async_trait;

use storefront_core::{Price, ProductId, StoreError};
use storefront_products::{NewProduct, Product, ProductStore, StockDelta};

use super::table::InMemoryTable;

/// In-memory catalog.
///
/// `update_quantity` checks and applies the whole batch under one write lock, so
/// concurrent placements cannot both take the last units.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: InMemoryTable<Product>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product with a known id.
    pub fn insert(&self, product: Product) -> Result<(), StoreError> {
        self.table.upsert(product)
    }

    pub fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.table.get(&id)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.table.len()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.table.is_empty()
    }

    /// Reprice a product. Orders already placed keep their own copy of the price.
    pub fn set_price(&self, id: ProductId, price: Price) -> Result<(), StoreError> {
        let mut rows = self.table.write()?;
        let product = rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("product {id}")))?;
        product.price = price;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let rows = self.table.read()?;
        let mut found: Vec<Product> = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(p) = rows.get(id) {
                if !found.iter().any(|f| f.id == p.id) {
                    found.push(p.clone());
                }
            }
        }
        Ok(found)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let rows = self.table.read()?;
        Ok(rows.values().find(|p| p.name == name).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut rows = self.table.write()?;
        if rows.values().any(|p| p.name == product.name) {
            return Err(StoreError::conflict(format!(
                "product name '{}' already exists",
                product.name
            )));
        }

        let product = Product {
            id: ProductId::new(),
            name: product.name,
            price: product.price,
            quantity: product.quantity,
        };
        rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_quantity(&self, deltas: &[StockDelta]) -> Result<(), StoreError> {
        let wanted = StockDelta::sum_by_product(deltas)?;
        let mut rows = self.table.write()?;

        // Check everything first so a refusal leaves every product untouched.
        for d in &wanted {
            let product = rows
                .get(&d.product_id)
                .ok_or_else(|| StoreError::not_found(format!("product {}", d.product_id)))?;
            if product.quantity < d.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: d.product_id,
                    requested: d.quantity,
                    available: product.quantity,
                });
            }
        }

        for d in &wanted {
            if let Some(product) = rows.get_mut(&d.product_id) {
                product.quantity -= d.quantity;
            }
        }
        Ok(())
    }
}
