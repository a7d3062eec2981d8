//! CompletePurchaseHandler - Command handler for fulfilling a settled payment.
//!
//! Idempotent on the payment reference: any number of deliveries of the same
//! completion produce exactly one purchase row and one access grant.

use std::sync::Arc;

use crate::domain::payment::CompletionMetadata;
use crate::domain::purchase::{
    ContentAccessGrant, NewPurchase, PaymentReference, Purchase, PurchaseError,
};
use crate::ports::{ContentReader, FeeScheduleSource, InsertOutcome, PurchaseRepository};

/// Command to record a completed payment.
#[derive(Debug, Clone)]
pub struct CompletePurchaseCommand {
    pub payment_reference: PaymentReference,
    pub metadata: CompletionMetadata,
}

/// Result of completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletePurchaseResult {
    pub purchase: Purchase,
    /// False when an earlier delivery already recorded this payment.
    pub newly_created: bool,
}

/// Handler for purchase completion.
pub struct CompletePurchaseHandler {
    repository: Arc<dyn PurchaseRepository>,
    content_reader: Arc<dyn ContentReader>,
    fee_source: Arc<dyn FeeScheduleSource>,
}

impl CompletePurchaseHandler {
    pub fn new(
        repository: Arc<dyn PurchaseRepository>,
        content_reader: Arc<dyn ContentReader>,
        fee_source: Arc<dyn FeeScheduleSource>,
    ) -> Self {
        Self {
            repository,
            content_reader,
            fee_source,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompletePurchaseCommand,
    ) -> Result<CompletePurchaseResult, PurchaseError> {
        // Fast path for redelivered events
        if let Some(existing) = self
            .repository
            .find_by_payment_reference(&cmd.payment_reference)
            .await?
        {
            tracing::debug!(
                payment_reference = %cmd.payment_reference.as_str(),
                purchase_id = %existing.id,
                "Payment already recorded"
            );
            return Ok(CompletePurchaseResult {
                purchase: existing,
                newly_created: false,
            });
        }

        let metadata = cmd.metadata;

        let content = self
            .content_reader
            .find_by_id(&metadata.content_id)
            .await?
            .ok_or_else(|| {
                PurchaseError::payment_processing(format!(
                    "content {} not found",
                    metadata.content_id
                ))
            })?;

        let organization_id = metadata
            .organization_id
            .or(content.organization_id)
            .ok_or_else(|| {
                PurchaseError::payment_processing(format!(
                    "content {} has no organization",
                    metadata.content_id
                ))
            })?;

        let fees = self.fee_source.resolve(&organization_id).await?;
        let split = fees.split(metadata.amount_paid_cents)?;

        let purchase = Purchase::completed(
            NewPurchase {
                payment_reference: cmd.payment_reference.clone(),
                customer_id: metadata.customer_id,
                content_id: metadata.content_id,
                organization_id,
                amount_paid_cents: metadata.amount_paid_cents,
                currency: metadata.currency,
            },
            split,
        )?;
        let grant = ContentAccessGrant::for_purchase(&purchase);

        match self
            .repository
            .insert_with_access_grant(&purchase, &grant)
            .await?
        {
            InsertOutcome::Inserted(purchase) => {
                tracing::info!(
                    purchase_id = %purchase.id,
                    content_id = %purchase.content_id,
                    organization_id = %purchase.organization_id,
                    amount_paid_cents = purchase.amount_paid_cents,
                    platform_fee_cents = purchase.platform_fee_cents,
                    organization_fee_cents = purchase.organization_fee_cents,
                    creator_payout_cents = purchase.creator_payout_cents,
                    "Purchase completed"
                );
                Ok(CompletePurchaseResult {
                    purchase,
                    newly_created: true,
                })
            }
            InsertOutcome::Conflicted { payment_reference } => {
                // A concurrent delivery won the insert; return its row.
                let winner = self
                    .repository
                    .find_by_payment_reference(&payment_reference)
                    .await?
                    .ok_or_else(|| {
                        PurchaseError::internal(format!(
                            "payment reference {} conflicted but no purchase exists",
                            payment_reference.as_str()
                        ))
                    })?;
                tracing::info!(
                    payment_reference = %payment_reference.as_str(),
                    purchase_id = %winner.id,
                    "Concurrent completion resolved to existing purchase"
                );
                Ok(CompletePurchaseResult {
                    purchase: winner,
                    newly_created: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fees::ConfiguredFeeSchedule;
    use crate::adapters::memory::{InMemoryContentCatalog, InMemoryPurchaseStore};
    use crate::domain::content::{published_content, Content};
    use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId, UserId};
    use crate::domain::purchase::{Currency, FeeSchedule};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Loses every insert race: the first lookup misses, the insert conflicts,
    /// and the re-read returns whatever `winner` holds.
    struct RacingRepository {
        winner: Option<Purchase>,
        lookups: Mutex<u32>,
        inserts: Mutex<u32>,
    }

    impl RacingRepository {
        fn new(winner: Option<Purchase>) -> Self {
            Self {
                winner,
                lookups: Mutex::new(0),
                inserts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PurchaseRepository for RacingRepository {
        async fn find_by_payment_reference(
            &self,
            _reference: &PaymentReference,
        ) -> Result<Option<Purchase>, DomainError> {
            let mut lookups = self.lookups.lock().unwrap();
            *lookups += 1;
            if *lookups == 1 {
                Ok(None)
            } else {
                Ok(self.winner.clone())
            }
        }

        async fn insert_with_access_grant(
            &self,
            purchase: &Purchase,
            _grant: &ContentAccessGrant,
        ) -> Result<InsertOutcome, DomainError> {
            *self.inserts.lock().unwrap() += 1;
            Ok(InsertOutcome::Conflicted {
                payment_reference: purchase.payment_reference.clone(),
            })
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl PurchaseRepository for FailingRepository {
        async fn find_by_payment_reference(
            &self,
            _reference: &PaymentReference,
        ) -> Result<Option<Purchase>, DomainError> {
            Ok(None)
        }

        async fn insert_with_access_grant(
            &self,
            _purchase: &Purchase,
            _grant: &ContentAccessGrant,
        ) -> Result<InsertOutcome, DomainError> {
            Err(DomainError::database("connection reset"))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        catalog: InMemoryContentCatalog,
        store: InMemoryPurchaseStore,
        handler: CompletePurchaseHandler,
    }

    fn fixture_with(fees: ConfiguredFeeSchedule) -> Fixture {
        let catalog = InMemoryContentCatalog::new();
        let store = InMemoryPurchaseStore::new();
        let handler = CompletePurchaseHandler::new(
            Arc::new(store.clone()),
            Arc::new(catalog.clone()),
            Arc::new(fees),
        );
        Fixture {
            catalog,
            store,
            handler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ConfiguredFeeSchedule::new(FeeSchedule::default()))
    }

    fn command(reference: &str, content: &Content, amount: i64) -> CompletePurchaseCommand {
        CompletePurchaseCommand {
            payment_reference: PaymentReference::new(reference).unwrap(),
            metadata: CompletionMetadata {
                customer_id: UserId::new("customer-1").unwrap(),
                content_id: content.id,
                organization_id: content.organization_id,
                amount_paid_cents: amount,
                currency: Currency::usd(),
            },
        }
    }

    async fn seeded_content(fx: &Fixture, price: i64) -> Content {
        let content = published_content(Some(price));
        fx.catalog.insert(content.clone()).await;
        content
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Fulfilment
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn records_purchase_with_default_split() {
        let fx = fixture();
        let content = seeded_content(&fx, 2999).await;

        let result = fx
            .handler
            .handle(command("pi_1", &content, 2999))
            .await
            .unwrap();

        assert!(result.newly_created);
        let p = &result.purchase;
        assert_eq!(p.platform_fee_cents, 300);
        assert_eq!(p.organization_fee_cents, 0);
        assert_eq!(p.creator_payout_cents, 2699);
        assert!(p.is_completed());
        assert!(p.purchased_at.is_some());
    }

    #[tokio::test]
    async fn grants_access_alongside_purchase() {
        let fx = fixture();
        let content = seeded_content(&fx, 1000).await;

        let result = fx
            .handler
            .handle(command("pi_grant", &content, 1000))
            .await
            .unwrap();

        let grant = fx
            .store
            .access_grant(&result.purchase.customer_id, &content.id)
            .await
            .expect("grant written");
        assert_eq!(grant.expires_at, None);
    }

    #[tokio::test]
    async fn organization_override_is_applied() {
        let content = published_content(Some(10_000));
        let org = content.organization_id.unwrap();
        let fees = ConfiguredFeeSchedule::new(FeeSchedule::default())
            .with_override(org, FeeSchedule::try_new(1500, 500).unwrap());
        let fx = fixture_with(fees);
        fx.catalog.insert(content.clone()).await;

        let result = fx
            .handler
            .handle(command("pi_org", &content, 10_000))
            .await
            .unwrap();

        assert_eq!(result.purchase.platform_fee_cents, 1500);
        assert_eq!(result.purchase.organization_fee_cents, 425);
        assert_eq!(result.purchase.creator_payout_cents, 8075);
    }

    #[tokio::test]
    async fn missing_metadata_organization_is_resolved_from_content() {
        let fx = fixture();
        let content = seeded_content(&fx, 500).await;
        let mut cmd = command("pi_resolve", &content, 500);
        cmd.metadata.organization_id = None;

        let result = fx.handler.handle(cmd).await.unwrap();

        assert_eq!(Some(result.purchase.organization_id), content.organization_id);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotency
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn redelivery_returns_existing_purchase() {
        let fx = fixture();
        let content = seeded_content(&fx, 2999).await;

        let first = fx
            .handler
            .handle(command("pi_dup", &content, 2999))
            .await
            .unwrap();
        let second = fx
            .handler
            .handle(command("pi_dup", &content, 2999))
            .await
            .unwrap();

        assert!(first.newly_created);
        assert!(!second.newly_created);
        assert_eq!(first.purchase.id, second.purchase.id);
        assert_eq!(fx.store.purchase_count().await, 1);
        assert_eq!(fx.store.grant_count().await, 1);
    }

    #[tokio::test]
    async fn redelivery_succeeds_even_if_content_was_removed() {
        let fx = fixture();
        let content = seeded_content(&fx, 2999).await;
        fx.handler
            .handle(command("pi_gone", &content, 2999))
            .await
            .unwrap();
        fx.catalog.remove(&content.id).await;

        let again = fx
            .handler
            .handle(command("pi_gone", &content, 2999))
            .await
            .unwrap();

        assert!(!again.newly_created);
    }

    #[tokio::test]
    async fn lost_insert_race_returns_winning_row() {
        let catalog = InMemoryContentCatalog::new();
        let content = published_content(Some(2999));
        catalog.insert(content.clone()).await;

        let winner_fx = fixture();
        winner_fx.catalog.insert(content.clone()).await;
        let winner = winner_fx
            .handler
            .handle(command("pi_race", &content, 2999))
            .await
            .unwrap()
            .purchase;

        let repo = Arc::new(RacingRepository::new(Some(winner.clone())));
        let handler = CompletePurchaseHandler::new(
            repo.clone(),
            Arc::new(catalog),
            Arc::new(ConfiguredFeeSchedule::new(FeeSchedule::default())),
        );

        let result = handler
            .handle(command("pi_race", &content, 2999))
            .await
            .unwrap();

        assert!(!result.newly_created);
        assert_eq!(result.purchase, winner);
        assert_eq!(*repo.inserts.lock().unwrap(), 1);
        assert_eq!(*repo.lookups.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn conflict_without_row_is_internal_error() {
        let catalog = InMemoryContentCatalog::new();
        let content = published_content(Some(2999));
        catalog.insert(content.clone()).await;
        let handler = CompletePurchaseHandler::new(
            Arc::new(RacingRepository::new(None)),
            Arc::new(catalog),
            Arc::new(ConfiguredFeeSchedule::new(FeeSchedule::default())),
        );

        let err = handler
            .handle(command("pi_ghost", &content, 2999))
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::Internal(_)));
    }

    #[tokio::test]
    async fn database_failure_is_surfaced() {
        let catalog = InMemoryContentCatalog::new();
        let content = published_content(Some(2999));
        catalog.insert(content.clone()).await;
        let handler = CompletePurchaseHandler::new(
            Arc::new(FailingRepository),
            Arc::new(catalog),
            Arc::new(ConfiguredFeeSchedule::new(FeeSchedule::default())),
        );

        let err = handler
            .handle(command("pi_db", &content, 2999))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(err.is_retryable());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deliveries_create_one_purchase() {
        let fx = fixture();
        let content = seeded_content(&fx, 2999).await;
        let handler = Arc::new(fx.handler);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handler = handler.clone();
            let cmd = command("pi_concurrent", &content, 2999);
            tasks.push(tokio::spawn(async move { handler.handle(cmd).await }));
        }

        let mut created = 0;
        let mut ids = Vec::new();
        for task in tasks {
            let result = task.await.unwrap().unwrap();
            if result.newly_created {
                created += 1;
            }
            ids.push(result.purchase.id);
        }

        assert_eq!(created, 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(fx.store.purchase_count().await, 1);
        assert_eq!(fx.store.grant_count().await, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_content_fails_without_writing() {
        let fx = fixture();
        let content = published_content(Some(500));

        let err = fx
            .handler
            .handle(command("pi_missing", &content, 500))
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::PaymentProcessing(_)));
        assert_eq!(fx.store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn unresolvable_organization_fails() {
        let fx = fixture();
        let content = Content {
            organization_id: None,
            ..published_content(Some(500))
        };
        fx.catalog.insert(content.clone()).await;
        let mut cmd = command("pi_personal", &content, 500);
        cmd.metadata.organization_id = None;

        let err = fx.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, PurchaseError::PaymentProcessing(_)));
        assert_eq!(fx.store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn negative_amount_fails() {
        let fx = fixture();
        let content = seeded_content(&fx, 500).await;

        let err = fx
            .handler
            .handle(command("pi_neg", &content, -1))
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::PaymentProcessing(_)));
    }

    #[tokio::test]
    async fn metadata_organization_takes_precedence() {
        let fx = fixture();
        let content = seeded_content(&fx, 500).await;
        let other = OrganizationId::new();
        let mut cmd = command("pi_meta_org", &content, 500);
        cmd.metadata.organization_id = Some(other);

        let result = fx.handler.handle(cmd).await.unwrap();

        assert_eq!(result.purchase.organization_id, other);
    }
}
