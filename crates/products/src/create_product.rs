//! Product creation service.

use thiserror::Error;
use tracing::{info, instrument};

use storefront_core::{Price, StoreError};

use crate::product::{NewProduct, Product};
use crate::store::ProductStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("a product named '{0}' already exists")]
    DuplicateProduct(String),

    #[error(transparent)]
    Store(StoreError),
}

/// Adds products to the catalog, keeping names unique.
pub struct ProductCreator<P> {
    products: P,
}

impl<P: ProductStore> ProductCreator<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    /// Create a product unless one with the same name exists.
    ///
    /// Price and quantity are stored as given.
    #[instrument(skip(self, price), fields(price = %price), err)]
    pub async fn execute(
        &self,
        name: &str,
        price: Price,
        quantity: i64,
    ) -> Result<Product, ProductError> {
        if self
            .products
            .find_by_name(name)
            .await
            .map_err(ProductError::Store)?
            .is_some()
        {
            return Err(ProductError::DuplicateProduct(name.to_string()));
        }

        let product = self
            .products
            .create(NewProduct {
                name: name.to_string(),
                price,
                quantity,
            })
            .await
            .map_err(|e| match e {
                // Lost a race against a concurrent create of the same name.
                StoreError::Conflict(_) => ProductError::DuplicateProduct(name.to_string()),
                other => ProductError::Store(other),
            })?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use storefront_core::ProductId;

    use super::*;
    use crate::product::StockDelta;

    #[derive(Default)]
    struct FakeProducts {
        rows: Mutex<Vec<Product>>,
        /// Pretend another writer took the name between lookup and insert.
        conflict_on_create: bool,
    }

    impl FakeProducts {
        fn with(product: Product) -> Self {
            Self {
                rows: Mutex::new(vec![product]),
                conflict_on_create: false,
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProductStore for FakeProducts {
        async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|p| p.name == name).cloned())
        }

        async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
            if self.conflict_on_create {
                return Err(StoreError::conflict("products_name_key"));
            }
            let product = Product {
                id: ProductId::new(),
                name: product.name,
                price: product.price,
                quantity: product.quantity,
            };
            self.rows.lock().unwrap().push(product.clone());
            Ok(product)
        }

        async fn update_quantity(&self, _deltas: &[StockDelta]) -> Result<(), StoreError> {
            unreachable!("product creation never touches stock")
        }
    }

    fn widget() -> Product {
        Product {
            id: ProductId::new(),
            name: "Widget".to_string(),
            price: Price::from_cents(500),
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn creates_product_with_given_attributes() {
        let creator = ProductCreator::new(FakeProducts::default());
        let price = Price::new(dec!(10.00)).unwrap();

        let product = creator.execute("Gadget", price, 7).await.unwrap();

        assert_eq!(product.name, "Gadget");
        assert_eq!(product.price, price);
        assert_eq!(product.quantity, 7);
        assert_eq!(creator.products.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_and_nothing_is_created() {
        let creator = ProductCreator::new(FakeProducts::with(widget()));

        let err = creator
            .execute("Widget", Price::from_cents(100), 3)
            .await
            .unwrap_err();

        assert_eq!(err, ProductError::DuplicateProduct("Widget".to_string()));
        assert_eq!(creator.products.len(), 1);
    }

    #[tokio::test]
    async fn name_match_is_exact() {
        let creator = ProductCreator::new(FakeProducts::with(widget()));

        let product = creator
            .execute("widget", Price::from_cents(100), 3)
            .await
            .unwrap();

        assert_eq!(product.name, "widget");
        assert_eq!(creator.products.len(), 2);
    }

    #[tokio::test]
    async fn negative_stock_is_not_validated_here() {
        let creator = ProductCreator::new(FakeProducts::default());

        let product = creator
            .execute("Backorder", Price::ZERO, -2)
            .await
            .unwrap();

        assert_eq!(product.quantity, -2);
    }

    #[tokio::test]
    async fn store_conflict_on_insert_reports_duplicate() {
        let creator = ProductCreator::new(FakeProducts {
            conflict_on_create: true,
            ..FakeProducts::default()
        });

        let err = creator
            .execute("Widget", Price::from_cents(100), 1)
            .await
            .unwrap_err();

        assert_eq!(err, ProductError::DuplicateProduct("Widget".to_string()));
    }
}
