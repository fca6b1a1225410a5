//! Recording store fakes for workflow tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use storefront_core::{CustomerId, OrderId, Price, ProductId, StoreError};
use storefront_parties::{Customer, CustomerStore};
use storefront_products::{NewProduct, Product, ProductStore, StockDelta};

use crate::create_order::OrderCreator;
use crate::order::{LineItem, Order};
use crate::store::OrderStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    FindCustomer,
    FindProducts(Vec<ProductId>),
    CreateOrder,
    UpdateQuantity(Vec<StockDelta>),
    DiscardOrder,
}

type Log = Arc<Mutex<Vec<Call>>>;

pub(crate) struct FakeCustomers {
    rows: HashMap<CustomerId, Customer>,
    log: Log,
}

#[async_trait]
impl CustomerStore for FakeCustomers {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        self.log.lock().unwrap().push(Call::FindCustomer);
        Ok(self.rows.get(&id).cloned())
    }
}

pub(crate) struct FakeProducts {
    rows: Mutex<HashMap<ProductId, Product>>,
    shrink_before_update: Mutex<Option<(ProductId, i64)>>,
    fail_next_update: AtomicBool,
    log: Log,
}

impl FakeProducts {
    pub(crate) fn set_price(&self, id: ProductId, price: Price) {
        if let Some(p) = self.rows.lock().unwrap().get_mut(&id) {
            p.price = price;
        }
    }

    /// Simulate a concurrent order taking stock after validation.
    pub(crate) fn shrink_stock_before_update(&self, id: ProductId, quantity: i64) {
        *self.shrink_before_update.lock().unwrap() = Some((id, quantity));
    }

    /// The next `update_quantity` fails with a backend error and changes nothing.
    pub(crate) fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for FakeProducts {
    async fn find_all_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        self.log.lock().unwrap().push(Call::FindProducts(ids.to_vec()));
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|p| p.name == name).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = Product {
            id: ProductId::new(),
            name: product.name,
            price: product.price,
            quantity: product.quantity,
        };
        self.rows.lock().unwrap().insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_quantity(&self, deltas: &[StockDelta]) -> Result<(), StoreError> {
        self.log.lock().unwrap().push(Call::UpdateQuantity(deltas.to_vec()));
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(StoreError::backend("deadlock detected"));
        }
        let mut rows = self.rows.lock().unwrap();

        if let Some((id, quantity)) = self.shrink_before_update.lock().unwrap().take() {
            if let Some(p) = rows.get_mut(&id) {
                p.quantity = quantity;
            }
        }

        let wanted = StockDelta::sum_by_product(deltas)?;
        for d in &wanted {
            let product = rows
                .get(&d.product_id)
                .ok_or_else(|| StoreError::not_found(format!("product {}", d.product_id)))?;
            if product.quantity < d.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: d.product_id,
                    requested: d.quantity,
                    available: product.quantity,
                });
            }
        }
        for d in wanted {
            if let Some(p) = rows.get_mut(&d.product_id) {
                p.quantity -= d.quantity;
            }
        }
        Ok(())
    }
}

pub(crate) struct FakeOrders {
    rows: Mutex<Vec<Order>>,
    fail_next_create: AtomicBool,
    fail_next_discard: AtomicBool,
    log: Log,
}

impl FakeOrders {
    pub(crate) fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub(crate) fn get(&self, id: OrderId) -> Option<Order> {
        self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }

    pub(crate) fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// The next `discard` fails and leaves the order in place.
    pub(crate) fn fail_next_discard(&self) {
        self.fail_next_discard.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStore for FakeOrders {
    async fn create(&self, customer: &Customer, items: Vec<LineItem>) -> Result<Order, StoreError> {
        self.log.lock().unwrap().push(Call::CreateOrder);
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(StoreError::backend("connection reset"));
        }
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            items,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn discard(&self, order_id: OrderId) -> Result<(), StoreError> {
        self.log.lock().unwrap().push(Call::DiscardOrder);
        if self.fail_next_discard.swap(false, Ordering::SeqCst) {
            return Err(StoreError::backend("connection reset"));
        }
        self.rows.lock().unwrap().retain(|o| o.id != order_id);
        Ok(())
    }
}

/// One customer, an empty catalog and an empty order book, all sharing a call log.
pub(crate) struct Harness {
    pub(crate) customer_id: CustomerId,
    pub(crate) customers: Arc<FakeCustomers>,
    pub(crate) products: Arc<FakeProducts>,
    pub(crate) orders: Arc<FakeOrders>,
    log: Log,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let log: Log = Arc::default();
        let customer = Customer::new(CustomerId::new(), "C1");
        Self {
            customer_id: customer.id,
            customers: Arc::new(FakeCustomers {
                rows: HashMap::from([(customer.id, customer)]),
                log: log.clone(),
            }),
            products: Arc::new(FakeProducts {
                rows: Mutex::default(),
                shrink_before_update: Mutex::default(),
                fail_next_update: AtomicBool::new(false),
                log: log.clone(),
            }),
            orders: Arc::new(FakeOrders {
                rows: Mutex::default(),
                fail_next_create: AtomicBool::new(false),
                fail_next_discard: AtomicBool::new(false),
                log: log.clone(),
            }),
            log,
        }
    }

    pub(crate) fn creator(
        &self,
    ) -> OrderCreator<Arc<FakeCustomers>, Arc<FakeProducts>, Arc<FakeOrders>> {
        OrderCreator::new(
            self.customers.clone(),
            self.products.clone(),
            self.orders.clone(),
        )
    }

    pub(crate) fn add_product(&self, name: &str, price: Price, quantity: i64) -> ProductId {
        let product = Product {
            id: ProductId::new(),
            name: name.to_string(),
            price,
            quantity,
        };
        let id = product.id;
        self.products.rows.lock().unwrap().insert(id, product);
        id
    }

    pub(crate) fn stock(&self, id: ProductId) -> i64 {
        self.products.rows.lock().unwrap()[&id].quantity
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }
}
