//! Catalog persistence boundary.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{ProductId, StoreError};

use crate::product::{NewProduct, Product, StockDelta};

/// Read/write access to the product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Returns the products matching `ids`. Unknown ids are skipped; order is not
    /// significant.
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// Exact, case-sensitive name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Insert a product under a fresh id.
    ///
    /// Fails with [`StoreError::Conflict`] if the name is already taken.
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Subtract each delta from its product's stock.
    ///
    /// The whole batch is one atomic conditional update: either every product has at
    /// least the requested units and all of them are decremented, or nothing changes and
    /// [`StoreError::InsufficientStock`] (or [`StoreError::NotFound`] for an unknown id)
    /// is returned. Deltas naming the same product are summed; a non-positive delta or
    /// an overflowing total fails with [`StoreError::InvalidDelta`] before anything is
    /// touched.
    async fn update_quantity(&self, deltas: &[StockDelta]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        (**self).find_all_by_id(ids).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        (**self).create(product).await
    }

    async fn update_quantity(&self, deltas: &[StockDelta]) -> Result<(), StoreError> {
        (**self).update_quantity(deltas).await
    }
}
