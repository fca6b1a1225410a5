//! Parties domain module (customers).
//!
//! Customers are looked up by the ordering workflow, never mutated by it. Their
//! creation lives outside this workspace; this crate only defines the entity and the
//! lookup boundary.

pub mod customer;
pub mod store;

pub use customer::Customer;
pub use store::CustomerStore;
