//! HandlePaymentWebhookHandler - Entry point for gateway callbacks.
//!
//! Authenticates the raw body, then dispatches on the verified event type.
//! The returned error decides whether the gateway redelivers: see
//! [`WebhookError::status_code`].

use std::sync::Arc;

use crate::domain::foundation::PurchaseId;
use crate::domain::payment::{GatewayEvent, WebhookError, WebhookVerifier};

use super::complete_purchase::{CompletePurchaseCommand, CompletePurchaseHandler};

/// Raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Body bytes exactly as received. Never re-serialized before verification.
    pub payload: Vec<u8>,
    pub signature: Option<String>,
}

/// Outcome of a processed delivery. Every variant is acknowledged with 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    PurchaseCompleted {
        purchase_id: PurchaseId,
        newly_created: bool,
    },
    /// Recognized event that needs no fulfilment.
    Acknowledged,
    /// Event type this service does not consume.
    Ignored,
}

pub struct HandlePaymentWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    complete_purchase: Arc<CompletePurchaseHandler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: Arc<WebhookVerifier>,
        complete_purchase: Arc<CompletePurchaseHandler>,
    ) -> Self {
        Self {
            verifier,
            complete_purchase,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .verifier
            .verify(&cmd.payload, cmd.signature.as_deref())?;

        match event {
            GatewayEvent::CheckoutCompleted(completed) => {
                if !completed.payment_status.is_settled() {
                    tracing::info!(
                        event_id = %completed.event_id,
                        session_id = %completed.session_id,
                        "Checkout completed without settled payment, skipping"
                    );
                    return Ok(WebhookOutcome::Acknowledged);
                }

                let result = self
                    .complete_purchase
                    .handle(CompletePurchaseCommand {
                        payment_reference: completed.payment_reference,
                        metadata: completed.metadata,
                    })
                    .await
                    .map_err(|err| {
                        tracing::error!(
                            event_id = %completed.event_id,
                            error = %err,
                            "Purchase completion failed"
                        );
                        err
                    })?;

                Ok(WebhookOutcome::PurchaseCompleted {
                    purchase_id: result.purchase.id,
                    newly_created: result.newly_created,
                })
            }
            GatewayEvent::CheckoutExpired { session_id } => {
                tracing::debug!(session_id = %session_id, "Checkout session expired");
                Ok(WebhookOutcome::Acknowledged)
            }
            GatewayEvent::Unhandled { event_type } => {
                tracing::debug!(event_type = %event_type, "Ignoring unhandled webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}
