//! PostgreSQL-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLSTATE | `StoreError` |
//! |---|---|---|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Backend` |
//! | PoolClosed, network, decode | n/a | `Backend` |
//!
//! All stores share one `PgPool`; call [`ensure_schema`] once before using them.

pub mod customers;
pub mod orders;
pub mod products;
pub mod schema;

pub use customers::PostgresCustomerStore;
pub use orders::PostgresOrderStore;
pub use products::PostgresProductStore;
pub use schema::ensure_schema;

use storefront_core::StoreError;

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

/// Pool for the `#[ignore]`d database tests. Needs `DATABASE_URL`.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    ensure_schema(&pool).await.expect("create schema");
    pool
}
