//! CreateCheckoutSessionHandler - Command handler for opening a hosted checkout.
//!
//! Validates the request and the content, then asks the gateway for a
//! session. Nothing is persisted locally; a failed gateway call leaves no
//! state behind.

use std::sync::Arc;

use crate::domain::foundation::{ContentId, Timestamp, UserId};
use crate::domain::purchase::{Currency, PurchaseError, RedirectAllowList};
use crate::ports::{CheckoutSessionRequest, ContentReader, PaymentGateway, PurchaseReader};

/// Gateway minimum for checkout session lifetime.
pub const MIN_SESSION_TTL_MINUTES: i64 = 30;

/// Added on top of the lifetime. The gateway measures its minimum from its
/// own creation time, which lags our clock by the request round trip.
pub const SESSION_EXPIRY_MARGIN_SECS: i64 = 60;

/// Command to start checkout for a content item.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub customer_id: UserId,
    pub content_id: ContentId,
    pub success_url: String,
    pub cancel_url: String,
}

/// Result of successful checkout initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub session_url: String,
}

/// Deployment-level checkout settings.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    pub redirect_allow_list: RedirectAllowList,
    pub currency: Currency,
    pub session_ttl_minutes: i64,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            redirect_allow_list: RedirectAllowList::default(),
            currency: Currency::usd(),
            session_ttl_minutes: MIN_SESSION_TTL_MINUTES,
        }
    }
}

/// Handler for opening checkout sessions.
pub struct CreateCheckoutSessionHandler {
    content_reader: Arc<dyn ContentReader>,
    purchase_reader: Arc<dyn PurchaseReader>,
    gateway: Arc<dyn PaymentGateway>,
    policy: CheckoutPolicy,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        content_reader: Arc<dyn ContentReader>,
        purchase_reader: Arc<dyn PurchaseReader>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            content_reader,
            purchase_reader,
            gateway,
            policy,
        }
    }

    /// Validation order: redirects, content state, organization, price,
    /// prior ownership. The first violation is returned.
    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, PurchaseError> {
        // 1. Redirect targets
        let success_url = self
            .policy
            .redirect_allow_list
            .validate("success_url", &cmd.success_url)?;
        let cancel_url = self
            .policy
            .redirect_allow_list
            .validate("cancel_url", &cmd.cancel_url)?;

        // 2-4. Content must be sellable
        let content = self
            .content_reader
            .find_by_id(&cmd.content_id)
            .await?
            .ok_or(PurchaseError::ContentNotFound(cmd.content_id))?;

        let purchasable = content
            .check_purchasable()
            .map_err(|reason| PurchaseError::not_purchasable(cmd.content_id, reason))?;

        // 5. No repeat purchases
        if self
            .purchase_reader
            .has_completed_purchase(&cmd.customer_id, &cmd.content_id)
            .await?
        {
            return Err(PurchaseError::AlreadyPurchased(cmd.content_id));
        }

        let request = CheckoutSessionRequest {
            content_id: purchasable.content_id,
            customer_id: cmd.customer_id.clone(),
            organization_id: purchasable.organization_id,
            creator_id: purchasable.creator_id,
            title: purchasable.title,
            amount_cents: purchasable.price_cents,
            currency: self.policy.currency.clone(),
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
            expires_at: Timestamp::now()
                .plus_minutes(self.policy.session_ttl_minutes.max(MIN_SESSION_TTL_MINUTES))
                .plus_seconds(SESSION_EXPIRY_MARGIN_SECS),
        };

        let session = self
            .gateway
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::warn!(
                    content_id = %cmd.content_id,
                    error = %e,
                    retryable = e.retryable,
                    "Checkout session creation failed"
                );
                PurchaseError::PaymentGateway(e.message)
            })?;

        tracing::info!(
            content_id = %cmd.content_id,
            customer_id = %cmd.customer_id,
            session_id = %session.id,
            amount_cents = purchasable.price_cents,
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            session_url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryContentCatalog, InMemoryPurchaseStore};
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::domain::content::{published_content, Content, ContentStatus, NotPurchasableReason};
    use crate::domain::foundation::OrganizationId;
    use crate::domain::purchase::{calculate, NewPurchase, PaymentReference, Purchase};
    use crate::ports::PaymentError;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        catalog: InMemoryContentCatalog,
        store: InMemoryPurchaseStore,
        gateway: MockPaymentGateway,
        handler: CreateCheckoutSessionHandler,
    }

    fn fixture() -> Fixture {
        let catalog = InMemoryContentCatalog::new();
        let store = InMemoryPurchaseStore::new();
        let gateway = MockPaymentGateway::new();
        let policy = CheckoutPolicy {
            redirect_allow_list: RedirectAllowList::new(["example.com"]),
            ..CheckoutPolicy::default()
        };
        let handler = CreateCheckoutSessionHandler::new(
            Arc::new(catalog.clone()),
            Arc::new(store.clone()),
            Arc::new(gateway.clone()),
            policy,
        );
        Fixture {
            catalog,
            store,
            gateway,
            handler,
        }
    }

    fn customer() -> UserId {
        UserId::new("customer-1").unwrap()
    }

    fn command(content_id: ContentId) -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            customer_id: customer(),
            content_id,
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://shop.example.com/cancel".to_string(),
        }
    }

    async fn seeded(fx: &Fixture, content: Content) -> ContentId {
        let id = content.id;
        fx.catalog.insert(content).await;
        id
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn opens_session_with_identifying_metadata() {
        let fx = fixture();
        let content = published_content(Some(2999));
        let org = content.organization_id;
        let id = seeded(&fx, content).await;

        let result = fx.handler.handle(command(id)).await.unwrap();

        assert_eq!(result.session_id, "cs_mock_1");
        let requests = fx.gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].content_id, id);
        assert_eq!(requests[0].customer_id, customer());
        assert_eq!(Some(requests[0].organization_id), org);
        assert_eq!(requests[0].creator_id.as_str(), "creator-1");
        assert_eq!(requests[0].amount_cents, 2999);
    }

    fn requested_lifetime_secs(fx: &Fixture, before: Timestamp) -> i64 {
        fx.gateway.requests()[0].expires_at.as_unix_secs() - before.as_unix_secs()
    }

    #[tokio::test]
    async fn default_expiry_clears_gateway_minimum_with_margin() {
        let fx = fixture();
        let id = seeded(&fx, published_content(Some(500))).await;
        let before = Timestamp::now();

        fx.handler.handle(command(id)).await.unwrap();

        let lifetime = requested_lifetime_secs(&fx, before);
        assert!(lifetime >= MIN_SESSION_TTL_MINUTES * 60 + SESSION_EXPIRY_MARGIN_SECS);
        assert!(lifetime <= MIN_SESSION_TTL_MINUTES * 60 + SESSION_EXPIRY_MARGIN_SECS + 5);
    }

    #[tokio::test]
    async fn short_ttl_is_raised_to_minimum() {
        let mut fx = fixture();
        fx.handler.policy.session_ttl_minutes = 5;
        let id = seeded(&fx, published_content(Some(500))).await;
        let before = Timestamp::now();

        fx.handler.handle(command(id)).await.unwrap();

        assert!(
            requested_lifetime_secs(&fx, before)
                >= MIN_SESSION_TTL_MINUTES * 60 + SESSION_EXPIRY_MARGIN_SECS
        );
    }

    #[tokio::test]
    async fn configured_ttl_is_honoured() {
        let mut fx = fixture();
        fx.handler.policy.session_ttl_minutes = 90;
        let id = seeded(&fx, published_content(Some(500))).await;
        let before = Timestamp::now();

        fx.handler.handle(command(id)).await.unwrap();

        let lifetime = requested_lifetime_secs(&fx, before);
        assert!(lifetime >= 90 * 60 + SESSION_EXPIRY_MARGIN_SECS);
        assert!(lifetime <= 90 * 60 + SESSION_EXPIRY_MARGIN_SECS + 5);
    }

    #[tokio::test]
    async fn creates_no_local_state() {
        let fx = fixture();
        let id = seeded(&fx, published_content(Some(500))).await;

        fx.handler.handle(command(id)).await.unwrap();

        assert_eq!(fx.store.purchase_count().await, 0);
        assert_eq!(fx.store.grant_count().await, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn untrusted_redirect_is_rejected_before_gateway() {
        let fx = fixture();
        let id = seeded(&fx, published_content(Some(500))).await;
        let mut cmd = command(id);
        cmd.success_url = "https://evil.net/steal".to_string();

        let err = fx.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, PurchaseError::Validation { ref field, .. } if field == "success_url"));
        assert_eq!(fx.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn redirect_check_runs_before_content_lookup() {
        let fx = fixture();
        let mut cmd = command(ContentId::new());
        cmd.cancel_url = "/relative".to_string();

        let err = fx.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, PurchaseError::Validation { ref field, .. } if field == "cancel_url"));
    }

    #[tokio::test]
    async fn unknown_content_is_not_found() {
        let fx = fixture();
        let err = fx.handler.handle(command(ContentId::new())).await.unwrap_err();
        assert!(matches!(err, PurchaseError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn null_price_is_no_price() {
        let fx = fixture();
        let id = seeded(&fx, published_content(None)).await;

        let err = fx.handler.handle(command(id)).await.unwrap_err();

        assert!(matches!(
            err,
            PurchaseError::ContentNotPurchasable {
                reason: NotPurchasableReason::NoPrice,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn draft_is_not_published() {
        let fx = fixture();
        let content = Content {
            status: ContentStatus::Draft,
            ..published_content(Some(500))
        };
        let id = seeded(&fx, content).await;

        let err = fx.handler.handle(command(id)).await.unwrap_err();

        assert!(matches!(
            err,
            PurchaseError::ContentNotPurchasable {
                reason: NotPurchasableReason::NotPublished,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn free_content_is_rejected() {
        let fx = fixture();
        let id = seeded(&fx, published_content(Some(0))).await;

        let err = fx.handler.handle(command(id)).await.unwrap_err();

        assert!(matches!(
            err,
            PurchaseError::ContentNotPurchasable {
                reason: NotPurchasableReason::Free,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn repeat_purchase_is_rejected() {
        let fx = fixture();
        let content = published_content(Some(2999));
        let new = NewPurchase {
            payment_reference: PaymentReference::new("pi_prior").unwrap(),
            customer_id: customer(),
            content_id: content.id,
            organization_id: content.organization_id.unwrap_or_else(OrganizationId::new),
            amount_paid_cents: 2999,
            currency: Currency::usd(),
        };
        fx.store
            .seed(Purchase::completed(new, calculate(2999, 1000, 0).unwrap()).unwrap())
            .await;
        let id = seeded(&fx, content).await;

        let err = fx.handler.handle(command(id)).await.unwrap_err();

        assert_eq!(err, PurchaseError::AlreadyPurchased(id));
        assert_eq!(fx.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_surfaced_without_state() {
        let fx = fixture();
        let id = seeded(&fx, published_content(Some(500))).await;
        fx.gateway.fail_next(PaymentError::network("timed out"));

        let err = fx.handler.handle(command(id)).await.unwrap_err();

        assert_eq!(err, PurchaseError::PaymentGateway("timed out".to_string()));
        assert!(err.is_retryable());
        assert_eq!(fx.store.purchase_count().await, 0);
    }
}
