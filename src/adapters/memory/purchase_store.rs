//! In-Memory Purchase Store
//!
//! Implements both purchase ports over a single lock so the purchase insert
//! and the access grant upsert are observed together. Enforces the same
//! payment reference uniqueness as the Postgres schema.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ContentId, DomainError, PurchaseId, UserId};
use crate::domain::purchase::{ContentAccessGrant, PaymentReference, Purchase, PurchaseStatus};
use crate::ports::{InsertOutcome, ListOptions, PurchaseList, PurchaseReader, PurchaseRepository};

#[derive(Debug, Default)]
struct StoreState {
    purchases: HashMap<PurchaseId, Purchase>,
    by_reference: HashMap<PaymentReference, PurchaseId>,
    grants: HashMap<(UserId, ContentId), ContentAccessGrant>,
}

/// In-memory purchase and access grant storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPurchaseStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a purchase with its grant, bypassing conflict detection.
    pub async fn seed(&self, purchase: Purchase) {
        let grant = ContentAccessGrant::for_purchase(&purchase);
        let mut state = self.state.write().await;
        state
            .by_reference
            .insert(purchase.payment_reference.clone(), purchase.id);
        state
            .grants
            .insert((grant.customer_id.clone(), grant.content_id), grant);
        state.purchases.insert(purchase.id, purchase);
    }

    pub async fn purchase_count(&self) -> usize {
        self.state.read().await.purchases.len()
    }

    pub async fn grant_count(&self) -> usize {
        self.state.read().await.grants.len()
    }

    pub async fn access_grant(
        &self,
        customer_id: &UserId,
        content_id: &ContentId,
    ) -> Option<ContentAccessGrant> {
        self.state
            .read()
            .await
            .grants
            .get(&(customer_id.clone(), *content_id))
            .cloned()
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseStore {
    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Purchase>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .by_reference
            .get(reference)
            .and_then(|id| state.purchases.get(id))
            .cloned())
    }

    async fn insert_with_access_grant(
        &self,
        purchase: &Purchase,
        grant: &ContentAccessGrant,
    ) -> Result<InsertOutcome, DomainError> {
        let mut state = self.state.write().await;

        if state.by_reference.contains_key(&purchase.payment_reference) {
            return Ok(InsertOutcome::Conflicted {
                payment_reference: purchase.payment_reference.clone(),
            });
        }

        state
            .by_reference
            .insert(purchase.payment_reference.clone(), purchase.id);
        state.purchases.insert(purchase.id, purchase.clone());
        state
            .grants
            .insert((grant.customer_id.clone(), grant.content_id), grant.clone());

        Ok(InsertOutcome::Inserted(purchase.clone()))
    }
}

#[async_trait]
impl PurchaseReader for InMemoryPurchaseStore {
    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError> {
        Ok(self.state.read().await.purchases.get(id).cloned())
    }

    async fn has_completed_purchase(
        &self,
        customer_id: &UserId,
        content_id: &ContentId,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.purchases.values().any(|p| {
            p.customer_id == *customer_id
                && p.content_id == *content_id
                && p.status == PurchaseStatus::Completed
        }))
    }

    async fn list_by_customer(
        &self,
        customer_id: &UserId,
        options: &ListOptions,
    ) -> Result<PurchaseList, DomainError> {
        let state = self.state.read().await;

        let mut matching: Vec<&Purchase> = state
            .purchases
            .values()
            .filter(|p| p.customer_id == *customer_id && options.matches(p))
            .collect();
        // Same order as the SQL reader: created_at DESC, id DESC
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .cloned()
            .collect();

        Ok(PurchaseList { items, total })
    }
}
