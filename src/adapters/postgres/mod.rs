//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresPurchaseRepository` - Idempotent purchase and access grant writes
//! - `PostgresPurchaseReader` - Customer-scoped purchase queries
//! - `PostgresContentReader` - Catalog snapshot reads

mod content_reader;
mod purchase_reader;
mod purchase_repository;
mod purchase_rows;

pub use content_reader::PostgresContentReader;
pub use purchase_reader::PostgresPurchaseReader;
pub use purchase_repository::PostgresPurchaseRepository;
