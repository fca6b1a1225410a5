use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use storefront_core::{Price, ProductId, StoreError};
use storefront_products::{NewProduct, Product, ProductStore, StockDelta};

use super::{is_unique_violation, map_sqlx_error};

/// Postgres-backed catalog.
///
/// ## Stock decrements
///
/// `update_quantity` runs every decrement in one transaction as
/// `UPDATE ... SET quantity = quantity - n WHERE id = $1 AND quantity >= n`.
/// A row that doesn't match rolls the whole batch back. Rows are touched in id order
/// so two concurrent batches over the same products cannot deadlock.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e| map_sqlx_error("decode_product", e);
    let id: uuid::Uuid = row.try_get("id").map_err(decode)?;
    let price: Decimal = row.try_get("price").map_err(decode)?;
    Ok(Product {
        id: ProductId::from_uuid(id),
        name: row.try_get("name").map_err(decode)?,
        price: Price::new(price).map_err(|e| StoreError::backend(format!("stored price: {e}")))?,
        quantity: row.try_get("quantity").map_err(decode)?,
    })
}

/// Explain why a conditional decrement matched no row.
async fn refusal(
    tx: &mut Transaction<'_, Postgres>,
    delta: &StockDelta,
) -> Result<StoreError, StoreError> {
    let row = sqlx::query("SELECT quantity FROM products WHERE id = $1")
        .bind(delta.product_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("read_stock", e))?;

    Ok(match row {
        None => StoreError::not_found(format!("product {}", delta.product_id)),
        Some(row) => StoreError::InsufficientStock {
            product_id: delta.product_id,
            requested: delta.quantity,
            available: row
                .try_get("quantity")
                .map_err(|e| map_sqlx_error("read_stock", e))?,
        },
    })
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let ids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, quantity
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, price, quantity FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_name", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(name = %product.name), err)]
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = Product {
            id: ProductId::new(),
            name: product.name,
            price: product.price,
            quantity: product.quantity,
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.quantity)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict(format!("product name '{}' already exists", product.name))
            } else {
                map_sqlx_error("insert_product", e)
            }
        })?;

        Ok(product)
    }

    #[instrument(skip(self, deltas), fields(lines = deltas.len()), err)]
    async fn update_quantity(&self, deltas: &[StockDelta]) -> Result<(), StoreError> {
        let mut wanted = StockDelta::sum_by_product(deltas)?;
        wanted.sort_by_key(|d| d.product_id);
        Span::current().record("lines", wanted.len());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for delta in &wanted {
            let updated = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - $2
                WHERE id = $1 AND quantity >= $2
                "#,
            )
            .bind(delta.product_id.as_uuid())
            .bind(delta.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("decrement_stock", e))?;

            if updated.rows_affected() == 0 {
                let err = refusal(&mut tx, delta).await?;
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err);
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }
}
