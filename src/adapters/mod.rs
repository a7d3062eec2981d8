//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `fees` - Fee schedule source backed by configuration
//! - `http` - Axum REST API
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - sqlx-backed persistence
//! - `stripe` - Stripe checkout gateway

pub mod fees;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use fees::ConfiguredFeeSchedule;
pub use memory::{InMemoryContentCatalog, InMemoryPurchaseStore};
pub use stripe::{MockPaymentGateway, StripeCheckoutGateway};
