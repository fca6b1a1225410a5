use async_trait::async_trait;

use storefront_core::{CustomerId, StoreError};
use storefront_parties::{Customer, CustomerStore};

use super::table::InMemoryTable;

/// In-memory customer directory.
///
/// Customers are registered elsewhere; `insert` is the seeding hook for dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    table: InMemoryTable<Customer>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) -> Result<(), StoreError> {
        self.table.upsert(customer)
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        self.table.get(&id)
    }
}
