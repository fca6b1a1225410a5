//! Storefront service wiring.

pub mod services;
