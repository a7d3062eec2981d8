//! Payment gateway webhook events.
//!
//! `StripeEvent` is the raw envelope as delivered. It is only turned into a
//! typed [`GatewayEvent`] after the signature has been verified, and every
//! field the purchase pipeline reads is validated here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ContentId, OrganizationId, UserId};
use crate::domain::purchase::{Currency, PaymentReference};

use super::webhook_errors::WebhookError;

/// Stripe webhook event envelope.
///
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }
}

/// Checkout session object, as embedded in checkout events.
#[derive(Debug, Clone, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Settlement state reported on a completed checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    NoPaymentRequired,
    Unpaid,
}

impl PaymentStatus {
    /// Unknown values are treated as unpaid.
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "no_payment_required" => PaymentStatus::NoPaymentRequired,
            _ => PaymentStatus::Unpaid,
        }
    }

    /// True when the customer's money has actually been captured.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired)
    }
}

/// Identifying data echoed back by the gateway for a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMetadata {
    pub customer_id: UserId,
    pub content_id: ContentId,
    /// Absent when the checkout metadata omitted it; resolved from the content.
    pub organization_id: Option<OrganizationId>,
    pub amount_paid_cents: i64,
    pub currency: Currency,
}

/// A completed checkout, ready for fulfilment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCompleted {
    pub event_id: String,
    pub session_id: String,
    /// Payment intent id, or the session id when the session has none.
    pub payment_reference: PaymentReference,
    pub payment_status: PaymentStatus,
    pub metadata: CompletionMetadata,
}

/// Verified gateway event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    CheckoutCompleted(CheckoutCompleted),
    CheckoutExpired { session_id: String },
    Unhandled { event_type: String },
}

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";

impl GatewayEvent {
    pub fn event_type(&self) -> &str {
        match self {
            GatewayEvent::CheckoutCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            GatewayEvent::CheckoutExpired { .. } => CHECKOUT_SESSION_EXPIRED,
            GatewayEvent::Unhandled { event_type } => event_type,
        }
    }
}

impl TryFrom<&StripeEvent> for GatewayEvent {
    type Error = WebhookError;

    fn try_from(event: &StripeEvent) -> Result<Self, Self::Error> {
        match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                let session = checkout_session(event)?;
                Ok(GatewayEvent::CheckoutCompleted(checkout_completed(
                    &event.id, session,
                )?))
            }
            CHECKOUT_SESSION_EXPIRED => {
                let session = checkout_session(event)?;
                Ok(GatewayEvent::CheckoutExpired {
                    session_id: session.id,
                })
            }
            other => Ok(GatewayEvent::Unhandled {
                event_type: other.to_string(),
            }),
        }
    }
}

fn checkout_session(event: &StripeEvent) -> Result<CheckoutSessionObject, WebhookError> {
    serde_json::from_value(event.data.object.clone())
        .map_err(|e| WebhookError::ParseError(format!("invalid checkout session: {}", e)))
}

fn checkout_completed(
    event_id: &str,
    session: CheckoutSessionObject,
) -> Result<CheckoutCompleted, WebhookError> {
    let customer_id = required_metadata(&session.metadata, "customer_id")?;
    let customer_id =
        UserId::new(customer_id).map_err(|e| WebhookError::ParseError(e.to_string()))?;

    let content_id: ContentId = required_metadata(&session.metadata, "content_id")?
        .parse()
        .map_err(|_| WebhookError::ParseError("content_id is not a UUID".to_string()))?;

    let organization_id = match optional_metadata(&session.metadata, "organization_id") {
        Some(raw) => Some(raw.parse::<OrganizationId>().map_err(|_| {
            WebhookError::ParseError("organization_id is not a UUID".to_string())
        })?),
        None => None,
    };

    let amount_paid_cents = session
        .amount_total
        .ok_or(WebhookError::MissingField("amount_total"))?;
    if amount_paid_cents < 0 {
        return Err(WebhookError::ParseError(
            "amount_total must not be negative".to_string(),
        ));
    }

    let currency = session
        .currency
        .as_deref()
        .ok_or(WebhookError::MissingField("currency"))
        .and_then(|c| Currency::new(c).map_err(|e| WebhookError::ParseError(e.to_string())))?;

    let reference = session
        .payment_intent
        .as_deref()
        .filter(|pi| !pi.trim().is_empty())
        .unwrap_or(&session.id);
    let payment_reference =
        PaymentReference::new(reference).map_err(|_| WebhookError::MissingField("id"))?;

    let payment_status = session
        .payment_status
        .as_deref()
        .map(PaymentStatus::parse)
        .unwrap_or(PaymentStatus::Unpaid);

    Ok(CheckoutCompleted {
        event_id: event_id.to_string(),
        session_id: session.id,
        payment_reference,
        payment_status,
        metadata: CompletionMetadata {
            customer_id,
            content_id,
            organization_id,
            amount_paid_cents,
            currency,
        },
    })
}

fn required_metadata<'a>(
    metadata: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, WebhookError> {
    optional_metadata(metadata, key).ok_or(WebhookError::MissingMetadata(key))
}

fn optional_metadata<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
