//! Purchase aggregate.
//!
//! A Purchase is the settled record of a one-time payment for a content item.
//!
//! # Design Decisions
//!
//! - **Money in cents**: All monetary values stored as i64 cents (not floats)
//! - **Idempotency anchor**: `payment_reference` is globally unique
//! - **Write-once**: Phase 1 only ever creates `completed` rows and never mutates them

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    ContentId, OrganizationId, PurchaseId, Timestamp, UserId, ValidationError,
};

use super::revenue::{RevenueSplit, RevenueSplitError};

/// Lifecycle state of a purchase.
///
/// Only `Completed` is written today; the rest are reserved for refund and
/// failure flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Refunded => "refunded",
            PurchaseStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(PurchaseStatus::Pending),
            "completed" => Ok(PurchaseStatus::Completed),
            "refunded" => Ok(PurchaseStatus::Refunded),
            "failed" => Ok(PurchaseStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown purchase status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The gateway's identifier for a completed charge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(reference: impl Into<String>) -> Result<Self, ValidationError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(ValidationError::empty_field("payment_reference"));
        }
        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO 4217 currency code, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim().to_ascii_lowercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter ISO 4217 code",
            ));
        }
        Ok(Self(code))
    }

    pub fn usd() -> Self {
        Self("usd".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settled transaction record.
///
/// # Invariants
///
/// - `amount_paid_cents == platform_fee_cents + organization_fee_cents + creator_payout_cents`
/// - every fee field is non-negative
/// - `payment_reference` is unique across all purchases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub payment_reference: PaymentReference,
    pub customer_id: UserId,
    pub content_id: ContentId,
    pub organization_id: OrganizationId,
    pub amount_paid_cents: i64,
    pub currency: Currency,
    pub platform_fee_cents: i64,
    pub organization_fee_cents: i64,
    pub creator_payout_cents: i64,
    pub status: PurchaseStatus,
    pub purchased_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inputs for a newly completed purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub payment_reference: PaymentReference,
    pub customer_id: UserId,
    pub content_id: ContentId,
    pub organization_id: OrganizationId,
    pub amount_paid_cents: i64,
    pub currency: Currency,
}

impl Purchase {
    /// Builds a `completed` purchase carrying `split`.
    ///
    /// # Errors
    ///
    /// `InvariantViolated` if `split` does not account for every cent of the
    /// amount paid; such a row must never be written.
    pub fn completed(new: NewPurchase, split: RevenueSplit) -> Result<Self, RevenueSplitError> {
        split.verify(new.amount_paid_cents)?;

        let now = Timestamp::now();
        Ok(Self {
            id: PurchaseId::new(),
            payment_reference: new.payment_reference,
            customer_id: new.customer_id,
            content_id: new.content_id,
            organization_id: new.organization_id,
            amount_paid_cents: new.amount_paid_cents,
            currency: new.currency,
            platform_fee_cents: split.platform_fee_cents,
            organization_fee_cents: split.organization_fee_cents,
            creator_payout_cents: split.creator_payout_cents,
            status: PurchaseStatus::Completed,
            purchased_at: Some(now),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn revenue_split(&self) -> RevenueSplit {
        RevenueSplit {
            platform_fee_cents: self.platform_fee_cents,
            organization_fee_cents: self.organization_fee_cents,
            creator_payout_cents: self.creator_payout_cents,
        }
    }

    pub fn is_owned_by(&self, customer_id: &UserId) -> bool {
        &self.customer_id == customer_id
    }

    pub fn is_completed(&self) -> bool {
        self.status == PurchaseStatus::Completed
    }
}
