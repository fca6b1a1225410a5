use sqlx::PgPool;
use tracing::instrument;

use storefront_core::StoreError;

use super::map_sqlx_error;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
        quantity BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        customer_id UUID NOT NULL REFERENCES customers (id),
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        product_id UUID NOT NULL REFERENCES products (id),
        price NUMERIC(12, 2) NOT NULL,
        quantity BIGINT NOT NULL,
        PRIMARY KEY (order_id, line_no)
    )
    "#,
];

/// Create the storefront tables if they don't exist yet.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}
