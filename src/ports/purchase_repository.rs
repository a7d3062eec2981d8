//! Purchase repository port (write side).
//!
//! # Design
//!
//! - **Atomic fulfilment**: A purchase and its access grant commit together or not at all
//! - **Idempotency anchor**: `payment_reference` is unique; a losing concurrent insert
//!   reports `Conflicted` instead of an error
//! - **No retries**: Implementations never loop; the caller re-reads once

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::purchase::{ContentAccessGrant, PaymentReference, Purchase};

/// Result of an idempotent insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// This call wrote the purchase and its grant.
    Inserted(Purchase),

    /// Another writer already holds this payment reference. Nothing was written.
    Conflicted { payment_reference: PaymentReference },
}

/// Repository port for purchase persistence.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Find a purchase by the gateway's payment reference.
    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Purchase>, DomainError>;

    /// Insert `purchase` and upsert `grant` in a single transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on any failure other than a payment reference conflict
    async fn insert_with_access_grant(
        &self,
        purchase: &Purchase,
        grant: &ContentAccessGrant,
    ) -> Result<InsertOutcome, DomainError>;
}
