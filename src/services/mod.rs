//! Services Layer
//!
//! Business logic between the REST handlers and the BaaS/market layers.
//! Handlers parse requests and shape responses; services validate and
//! delegate.
//!
//! # Services
//!
//! - `AuthService` - Register, login, logout, account lookup
//! - `OrderService` - Place, list, cancel simulated orders
//! - `PortfolioService` - List and create portfolio entries
//! - `AssistantService` - Canned analysis text for the AI assistant

pub mod assistant_service;
pub mod auth_service;
pub mod order_service;
pub mod portfolio_service;

pub use assistant_service::{AssistantService, AssistantReply};
pub use auth_service::{AuthService, LoginResult, RegisterResult};
pub use order_service::{OrderService, PlaceOrderResult};
pub use portfolio_service::{PortfolioService, PortfolioResult};
