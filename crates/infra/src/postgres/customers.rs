use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{CustomerId, StoreError};
use storefront_parties::{Customer, CustomerStore};

use super::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresCustomerStore {
    pool: Arc<PgPool>,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Register a customer. Re-inserting an existing id updates its name.
    #[instrument(skip(self, customer), fields(customer_id = %customer.id), err)]
    pub async fn insert(&self, customer: &Customer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_customer", e))?;

        row.map(|row| -> Result<Customer, StoreError> {
            let id: uuid::Uuid = row
                .try_get("id")
                .map_err(|e| map_sqlx_error("decode_customer", e))?;
            let name: String = row
                .try_get("name")
                .map_err(|e| map_sqlx_error("decode_customer", e))?;
            Ok(Customer::new(CustomerId::from_uuid(id), name))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::test_pool;

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn inserted_customer_is_found() {
        let store = PostgresCustomerStore::new(test_pool().await);
        let customer = Customer::new(CustomerId::new(), "C1");

        store.insert(&customer).await.unwrap();

        assert_eq!(store.find_by_id(customer.id).await.unwrap(), Some(customer));
        assert_eq!(store.find_by_id(CustomerId::new()).await.unwrap(), None);
    }
}
