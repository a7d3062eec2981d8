//! VerifyPurchaseHandler - Query handler for ownership checks.

use std::sync::Arc;

use crate::domain::foundation::{ContentId, UserId};
use crate::domain::purchase::PurchaseError;
use crate::ports::PurchaseReader;

/// Query: does the customer own the content?
#[derive(Debug, Clone)]
pub struct VerifyPurchaseQuery {
    pub customer_id: UserId,
    pub content_id: ContentId,
}

pub struct VerifyPurchaseHandler {
    reader: Arc<dyn PurchaseReader>,
}

impl VerifyPurchaseHandler {
    pub fn new(reader: Arc<dyn PurchaseReader>) -> Self {
        Self { reader }
    }

    /// True only for a `completed` purchase. Pending, failed and refunded
    /// purchases do not count.
    pub async fn handle(&self, query: VerifyPurchaseQuery) -> Result<bool, PurchaseError> {
        Ok(self
            .reader
            .has_completed_purchase(&query.customer_id, &query.content_id)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPurchaseStore;
    use crate::domain::foundation::OrganizationId;
    use crate::domain::purchase::{
        calculate, Currency, NewPurchase, PaymentReference, Purchase, PurchaseStatus,
    };

    fn purchase(customer: &str, content_id: ContentId, status: PurchaseStatus) -> Purchase {
        let new = NewPurchase {
            payment_reference: PaymentReference::new(format!("pi_{}", ContentId::new())).unwrap(),
            customer_id: UserId::new(customer).unwrap(),
            content_id,
            organization_id: OrganizationId::new(),
            amount_paid_cents: 1000,
            currency: Currency::usd(),
        };
        let mut p = Purchase::completed(new, calculate(1000, 1000, 0).unwrap()).unwrap();
        p.status = status;
        p
    }

    fn query(customer: &str, content_id: ContentId) -> VerifyPurchaseQuery {
        VerifyPurchaseQuery {
            customer_id: UserId::new(customer).unwrap(),
            content_id,
        }
    }

    #[tokio::test]
    async fn completed_purchase_is_owned() {
        let store = InMemoryPurchaseStore::new();
        let content = ContentId::new();
        store
            .seed(purchase("alice", content, PurchaseStatus::Completed))
            .await;
        let handler = VerifyPurchaseHandler::new(Arc::new(store));

        assert!(handler.handle(query("alice", content)).await.unwrap());
    }

    #[tokio::test]
    async fn other_customer_does_not_own() {
        let store = InMemoryPurchaseStore::new();
        let content = ContentId::new();
        store
            .seed(purchase("alice", content, PurchaseStatus::Completed))
            .await;
        let handler = VerifyPurchaseHandler::new(Arc::new(store));

        assert!(!handler.handle(query("bob", content)).await.unwrap());
    }

    #[tokio::test]
    async fn refunded_purchase_does_not_count() {
        let store = InMemoryPurchaseStore::new();
        let content = ContentId::new();
        store
            .seed(purchase("alice", content, PurchaseStatus::Refunded))
            .await;
        let handler = VerifyPurchaseHandler::new(Arc::new(store));

        assert!(!handler.handle(query("alice", content)).await.unwrap());
    }

    #[tokio::test]
    async fn no_purchases_is_false() {
        let handler = VerifyPurchaseHandler::new(Arc::new(InMemoryPurchaseStore::new()));
        assert!(!handler.handle(query("alice", ContentId::new())).await.unwrap());
    }
}
