//! Purchase reader port (read side / CQRS queries).
//!
//! Every listing is scoped to a single customer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentId, DomainError, PurchaseId, UserId};
use crate::domain::purchase::{Purchase, PurchaseStatus};

/// Reader port for purchase queries.
#[async_trait]
pub trait PurchaseReader: Send + Sync {
    /// Find a purchase by id, regardless of owner.
    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError>;

    /// True if the customer holds a `completed` purchase of the content.
    ///
    /// Backed by the (customer_id, content_id, status) index.
    async fn has_completed_purchase(
        &self,
        customer_id: &UserId,
        content_id: &ContentId,
    ) -> Result<bool, DomainError>;

    /// List a customer's purchases, most recent first.
    async fn list_by_customer(
        &self,
        customer_id: &UserId,
        options: &ListOptions,
    ) -> Result<PurchaseList, DomainError>;
}

/// Options for listing purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
    pub status: Option<PurchaseStatus>,
    pub content_id: Option<ContentId>,
}

impl ListOptions {
    /// Options for a 1-based page of `per_page` rows.
    pub fn paginated(page: u32, per_page: u32) -> Self {
        Self {
            limit: per_page,
            offset: page.saturating_sub(1).saturating_mul(per_page),
            status: None,
            content_id: None,
        }
    }

    pub fn with_status(mut self, status: PurchaseStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_content(mut self, content_id: ContentId) -> Self {
        self.content_id = Some(content_id);
        self
    }

    /// True if `purchase` passes the status and content filters.
    pub fn matches(&self, purchase: &Purchase) -> bool {
        self.status.map_or(true, |s| purchase.status == s)
            && self.content_id.map_or(true, |c| purchase.content_id == c)
    }
}

/// One page of a customer's purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseList {
    pub items: Vec<Purchase>,

    /// Total number of matching purchases across all pages.
    pub total: u64,
}
