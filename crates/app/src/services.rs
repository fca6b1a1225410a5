//! Store selection and service construction.
//!
//! `USE_PERSISTENT_STORES=true` wires the Postgres stores (the schema is created on
//! startup); otherwise everything lives in memory for the life of the process.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use storefront_core::{Price, StoreError};
use storefront_infra::memory::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductStore};
use storefront_infra::postgres::{
    ensure_schema, PostgresCustomerStore, PostgresOrderStore, PostgresProductStore,
};
use storefront_infra::{AppConfig, DatabaseConfig};
use storefront_parties::Customer;
use storefront_products::{Product, ProductCreator, ProductError, ProductStore};
use storefront_sales::{Order, OrderCreator, OrderError, OrderRequest};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

type InMemoryPlacement =
    OrderCreator<Arc<InMemoryCustomerStore>, Arc<InMemoryProductStore>, Arc<InMemoryOrderStore>>;
type PersistentPlacement =
    OrderCreator<Arc<PostgresCustomerStore>, Arc<PostgresProductStore>, Arc<PostgresOrderStore>>;

pub enum AppServices {
    InMemory {
        customers: Arc<InMemoryCustomerStore>,
        products: Arc<InMemoryProductStore>,
        placement: InMemoryPlacement,
        catalog: ProductCreator<Arc<InMemoryProductStore>>,
    },
    Persistent {
        customers: Arc<PostgresCustomerStore>,
        products: Arc<PostgresProductStore>,
        placement: PersistentPlacement,
        catalog: ProductCreator<Arc<PostgresProductStore>>,
    },
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServiceError> {
    match &config.database {
        Some(database) => build_persistent_services(config, database).await,
        None => Ok(build_in_memory_services(config)),
    }
}

fn build_in_memory_services(config: &AppConfig) -> AppServices {
    let customers = Arc::new(InMemoryCustomerStore::new());
    let products = Arc::new(InMemoryProductStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());

    let placement = OrderCreator::new(customers.clone(), products.clone(), orders)
        .with_policy(config.duplicate_lines);
    info!(duplicate_lines = %placement.policy(), "using in-memory stores");

    AppServices::InMemory {
        placement,
        catalog: ProductCreator::new(products.clone()),
        customers,
        products,
    }
}

async fn build_persistent_services(
    config: &AppConfig,
    database: &DatabaseConfig,
) -> Result<AppServices, ServiceError> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(&database.url)
        .await?;
    ensure_schema(&pool).await?;

    let customers = Arc::new(PostgresCustomerStore::new(pool.clone()));
    let products = Arc::new(PostgresProductStore::new(pool.clone()));
    let orders = Arc::new(PostgresOrderStore::new(pool));

    let placement = OrderCreator::new(customers.clone(), products.clone(), orders)
        .with_policy(config.duplicate_lines);
    info!(
        max_connections = database.max_connections,
        duplicate_lines = %placement.policy(),
        "using postgres stores"
    );

    Ok(AppServices::Persistent {
        placement,
        catalog: ProductCreator::new(products.clone()),
        customers,
        products,
    })
}

impl AppServices {
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Order, OrderError> {
        match self {
            AppServices::InMemory { placement, .. } => placement.execute(request).await,
            AppServices::Persistent { placement, .. } => placement.execute(request).await,
        }
    }

    pub async fn create_product(
        &self,
        name: &str,
        price: Price,
        quantity: i64,
    ) -> Result<Product, ProductError> {
        match self {
            AppServices::InMemory { catalog, .. } => catalog.execute(name, price, quantity).await,
            AppServices::Persistent { catalog, .. } => catalog.execute(name, price, quantity).await,
        }
    }

    pub async fn find_product(&self, name: &str) -> Result<Option<Product>, StoreError> {
        match self {
            AppServices::InMemory { products, .. } => products.find_by_name(name).await,
            AppServices::Persistent { products, .. } => products.find_by_name(name).await,
        }
    }

    /// Register a customer. Customer management lives outside this service, so this is
    /// only a seeding hook.
    pub async fn register_customer(&self, customer: Customer) -> Result<(), StoreError> {
        match self {
            AppServices::InMemory { customers, .. } => customers.insert(customer),
            AppServices::Persistent { customers, .. } => customers.insert(&customer).await,
        }
    }
}
