//! In-memory adapters for development and tests.

mod content_catalog;
mod purchase_store;

pub use content_catalog::InMemoryContentCatalog;
pub use purchase_store::InMemoryPurchaseStore;
