//! BaaS client module
//!
//! Thin wrapper over a PocketBase-style collection REST API. All
//! persistence and authentication are delegated here; the server keeps
//! no database of its own.

pub mod client;
pub mod records;

pub use client::{AuthSession, BaasClient};
pub use records::{AccountRecord, OrderRecord, OrderSide, OrderStatus, PortfolioRecord};
