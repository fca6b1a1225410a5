use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{CustomerId, OrderId, Price, ProductId, StoreError};
use storefront_parties::Customer;
use storefront_sales::{LineItem, Order, OrderStore};

use super::map_sqlx_error;

/// Postgres-backed order book. Header and lines are written in one transaction.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Load an order with its lines in placement order.
    #[instrument(skip(self), fields(order_id = %id), err)]
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let decode = |e| map_sqlx_error("decode_order", e);

        let Some(header) = sqlx::query("SELECT customer_id, created_at FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_order", e))?
        else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT product_id, price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_order_items", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let product_id: uuid::Uuid = row.try_get("product_id").map_err(decode)?;
            let price: Decimal = row.try_get("price").map_err(decode)?;
            items.push(LineItem {
                product_id: ProductId::from_uuid(product_id),
                price: Price::new(price)
                    .map_err(|e| StoreError::backend(format!("stored price: {e}")))?,
                quantity: row.try_get("quantity").map_err(decode)?,
            });
        }

        let customer_id: uuid::Uuid = header.try_get("customer_id").map_err(decode)?;
        let created_at: DateTime<Utc> = header.try_get("created_at").map_err(decode)?;
        Ok(Some(Order {
            id,
            customer_id: CustomerId::from_uuid(customer_id),
            items,
            created_at,
        }))
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, customer, items), fields(customer_id = %customer.id, lines = items.len()), err)]
    async fn create(&self, customer: &Customer, items: Vec<LineItem>) -> Result<Order, StoreError> {
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            items,
            // Postgres keeps microseconds; hand back what a later read returns.
            created_at: truncate_to_micros(Utc::now()),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("INSERT INTO orders (id, customer_id, created_at) VALUES ($1, $2, $3)")
            .bind(order.id.as_uuid())
            .bind(order.customer_id.as_uuid())
            .bind(order.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order", e))?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, line_no, product_id, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(line_no as i32)
            .bind(item.product_id.as_uuid())
            .bind(item.price.amount())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn discard(&self, order_id: OrderId) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("discard_order", e))?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("order {order_id}")));
        }
        Ok(())
    }
}

fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(at.timestamp_micros()).unwrap_or(at)
}
