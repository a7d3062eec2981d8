//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Purchase Ports
//!
//! - `PurchaseRepository` - Atomic purchase + access grant writes
//! - `PurchaseReader` - Ownership checks and purchase history
//!
//! ## Collaborator Ports
//!
//! - `ContentReader` - Read-only access to the content catalog
//! - `FeeScheduleSource` - Platform/organization fee resolution
//! - `PaymentGateway` - Hosted checkout session creation

mod content_reader;
mod fee_schedule_source;
mod payment_gateway;
mod purchase_reader;
mod purchase_repository;

pub use content_reader::ContentReader;
pub use fee_schedule_source::FeeScheduleSource;
pub use payment_gateway::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use purchase_reader::{ListOptions, PurchaseList, PurchaseReader};
pub use purchase_repository::{InsertOutcome, PurchaseRepository};
