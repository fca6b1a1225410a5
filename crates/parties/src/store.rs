//! Customer lookup boundary.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{CustomerId, StoreError};

use crate::customer::Customer;

/// Read access to customers.
///
/// Implementations must not have side effects on lookup.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Returns `Ok(None)` when no customer has this id.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

#[async_trait]
impl<S> CustomerStore for Arc<S>
where
    S: CustomerStore + ?Sized,
{
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        (**self).find_by_id(id).await
    }
}
