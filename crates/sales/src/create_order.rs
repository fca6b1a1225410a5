//! Order placement workflow.
//!
//! ```text
//! customer lookup
//!   ↓
//! quantity / duplicate-line checks (no store access)
//!   ↓
//! batch product lookup → every id must resolve
//!   ↓
//! stock check against the fetched snapshot
//!   ↓
//! line items with frozen prices
//!   ↓
//! OrderStore::create          (durability point)
//!   ↓
//! ProductStore::update_quantity (atomic conditional decrement)
//!   └─ on failure: OrderStore::discard, then report
//! ```
//!
//! Everything before `create` is read-only. The stock check is advisory: the
//! authoritative check is the store's conditional decrement, which is what keeps two
//! concurrent placements from selling the same units.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use storefront_core::{CustomerId, DomainError, ProductId, StoreError};
use storefront_parties::CustomerStore;
use storefront_products::{Product, ProductStore, StockDelta};

use crate::order::{LineItem, Order, OrderLineRequest, OrderRequest};
use crate::store::OrderStore;

/// What to do when a request lists the same product more than once.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateLinePolicy {
    /// Sum the quantities into one line before validating stock.
    #[default]
    Merge,
    /// Fail with [`OrderError::DuplicateLine`].
    Reject,
}

impl core::fmt::Display for DuplicateLinePolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DuplicateLinePolicy::Merge => f.write_str("merge"),
            DuplicateLinePolicy::Reject => f.write_str("reject"),
        }
    }
}

impl core::str::FromStr for DuplicateLinePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "reject" => Ok(Self::Reject),
            other => Err(DomainError::validation(format!(
                "duplicate line policy must be 'merge' or 'reject' (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("customer {0} does not exist")]
    CustomerNotFound(CustomerId),

    #[error("an order must contain at least one product")]
    NoLines,

    #[error("quantity must be greater than zero (product {product_id}, quantity {quantity})")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    #[error("product {0} is listed more than once")]
    DuplicateLine(ProductId),

    #[error("one or more products were not found: {}", join_ids(.0))]
    ProductNotFound(Vec<ProductId>),

    #[error("product {product_id} is out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl OrderError {
    /// `true` when the request itself was rejected, `false` when a store failed.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, OrderError::Store(_))
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Places orders.
///
/// Collaborators are passed in explicitly; any store implementation (or an `Arc` of
/// one) can be used.
pub struct OrderCreator<C, P, O> {
    customers: C,
    products: P,
    orders: O,
    policy: DuplicateLinePolicy,
}

impl<C, P, O> OrderCreator<C, P, O>
where
    C: CustomerStore,
    P: ProductStore,
    O: OrderStore,
{
    pub fn new(customers: C, products: P, orders: O) -> Self {
        Self {
            customers,
            products,
            orders,
            policy: DuplicateLinePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicateLinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicateLinePolicy {
        self.policy
    }

    /// Validate `request`, persist the order and reserve its stock.
    ///
    /// Fails fast on the first violated rule. Validation failures leave every store
    /// untouched; a failed stock reservation removes the order it had just created.
    #[instrument(
        skip(self, request),
        fields(
            customer_id = %request.customer_id,
            lines = request.products.len(),
            policy = %self.policy
        ),
        err
    )]
    pub async fn execute(&self, request: &OrderRequest) -> Result<Order, OrderError> {
        let customer = self
            .customers
            .find_by_id(request.customer_id)
            .await
            .map_err(OrderError::Store)?
            .ok_or(OrderError::CustomerNotFound(request.customer_id))?;

        let lines = normalize_lines(&request.products, self.policy)?;

        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let catalog: HashMap<ProductId, Product> = self
            .products
            .find_all_by_id(&ids)
            .await
            .map_err(OrderError::Store)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let missing: Vec<ProductId> = ids
            .iter()
            .filter(|id| !catalog.contains_key(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(OrderError::ProductNotFound(missing));
        }

        for line in &lines {
            if let Some(product) = catalog.get(&line.product_id) {
                if !product.has_stock_for(line.quantity) {
                    return Err(OrderError::OutOfStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available: product.quantity,
                    });
                }
            }
        }

        let items: Vec<LineItem> = lines
            .iter()
            .filter_map(|line| {
                catalog.get(&line.product_id).map(|product| LineItem {
                    product_id: product.id,
                    price: product.price,
                    quantity: line.quantity,
                })
            })
            .collect();

        let order = self
            .orders
            .create(&customer, items)
            .await
            .map_err(OrderError::Store)?;
        debug!(order_id = %order.id, "order persisted, reserving stock");

        // Per-line quantities as requested; the store sums repeated products.
        let deltas: Vec<StockDelta> = request
            .products
            .iter()
            .map(|l| StockDelta::new(l.product_id, l.quantity))
            .collect();

        if let Err(err) = self.products.update_quantity(&deltas).await {
            warn!(order_id = %order.id, error = %err, "stock reservation failed, discarding order");
            if let Err(discard_err) = self.orders.discard(order.id).await {
                error!(
                    order_id = %order.id,
                    error = %discard_err,
                    "failed to discard order after stock reservation failure"
                );
            }
            return Err(match err {
                StoreError::InsufficientStock {
                    product_id,
                    requested,
                    available,
                } => OrderError::OutOfStock {
                    product_id,
                    requested,
                    available,
                },
                other => OrderError::Store(other),
            });
        }

        info!(order_id = %order.id, total = %order.total(), "order placed");
        Ok(order)
    }
}

/// Reject non-positive quantities and apply the duplicate-line policy.
///
/// Pure: runs before any catalog access.
fn normalize_lines(
    requested: &[OrderLineRequest],
    policy: DuplicateLinePolicy,
) -> Result<Vec<OrderLineRequest>, OrderError> {
    if let Some(bad) = requested.iter().find(|l| l.quantity <= 0) {
        return Err(OrderError::InvalidQuantity {
            product_id: bad.product_id,
            quantity: bad.quantity,
        });
    }
    if requested.is_empty() {
        return Err(OrderError::NoLines);
    }

    let mut lines: Vec<OrderLineRequest> = Vec::with_capacity(requested.len());
    let mut position: HashMap<ProductId, usize> = HashMap::with_capacity(requested.len());

    for line in requested {
        match position.get(&line.product_id) {
            None => {
                position.insert(line.product_id, lines.len());
                lines.push(*line);
            }
            Some(_) if policy == DuplicateLinePolicy::Reject => {
                return Err(OrderError::DuplicateLine(line.product_id));
            }
            Some(&idx) => {
                let merged = &mut lines[idx];
                merged.quantity = merged.quantity.checked_add(line.quantity).ok_or(
                    OrderError::InvalidQuantity {
                        product_id: line.product_id,
                        quantity: line.quantity,
                    },
                )?;
            }
        }
    }

    Ok(lines)
}
