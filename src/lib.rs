//! Paper Trading Server - Simulated Stock Trading Backend
//!
//! A headless backend for a simulated stock-trading frontend. Persistence
//! and auth are delegated to a PocketBase-style BaaS; market data comes
//! from a quota-guarded third-party quote API with a synthetic fallback.

pub mod baas;
pub mod config;
pub mod error;
pub mod market;
pub mod server;
pub mod services;
pub mod state;
