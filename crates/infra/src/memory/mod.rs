//! In-memory store implementations for tests/dev.

pub mod customers;
pub mod orders;
pub mod products;
pub mod table;

pub use customers::InMemoryCustomerStore;
pub use orders::InMemoryOrderStore;
pub use products::InMemoryProductStore;
pub use table::InMemoryTable;
