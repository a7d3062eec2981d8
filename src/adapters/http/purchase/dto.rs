//! HTTP DTOs (Data Transfer Objects) for purchase endpoints.
//!
//! These types define the JSON request/response structure for the purchase API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::PurchaseHistoryPage;
use crate::domain::purchase::Purchase;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start checkout for a content item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub content_id: String,
    /// Where the gateway sends the customer after payment.
    pub success_url: String,
    pub cancel_url: String,
}

/// Query string for purchase history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_url: String,
    pub session_id: String,
}

/// Purchase as returned to its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: String,
    pub content_id: String,
    pub organization_id: String,
    pub amount_paid_cents: i64,
    pub currency: String,
    pub platform_fee_cents: i64,
    pub organization_fee_cents: i64,
    pub creator_payout_cents: i64,
    pub status: String,
    pub purchased_at: Option<String>,
    pub created_at: String,
}

impl From<Purchase> for PurchaseResponse {
    fn from(p: Purchase) -> Self {
        Self {
            id: p.id.to_string(),
            content_id: p.content_id.to_string(),
            organization_id: p.organization_id.to_string(),
            amount_paid_cents: p.amount_paid_cents,
            currency: p.currency.as_str().to_string(),
            platform_fee_cents: p.platform_fee_cents,
            organization_fee_cents: p.organization_fee_cents,
            creator_payout_cents: p.creator_payout_cents,
            status: p.status.as_str().to_string(),
            purchased_at: p.purchased_at.map(|t| t.as_datetime().to_rfc3339()),
            created_at: p.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// One page of purchase history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryResponse {
    pub items: Vec<PurchaseResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_more: bool,
}

impl From<PurchaseHistoryPage> for PurchaseHistoryResponse {
    fn from(page: PurchaseHistoryPage) -> Self {
        Self {
            items: page.items.into_iter().map(PurchaseResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPurchaseResponse {
    pub purchased: bool,
}

/// Acknowledgement returned to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContentId, OrganizationId, UserId};
    use crate::domain::purchase::{calculate, Currency, NewPurchase, PaymentReference};

    fn purchase() -> Purchase {
        let new = NewPurchase {
            payment_reference: PaymentReference::new("pi_dto").unwrap(),
            customer_id: UserId::new("alice").unwrap(),
            content_id: ContentId::new(),
            organization_id: OrganizationId::new(),
            amount_paid_cents: 2999,
            currency: Currency::usd(),
        };
        Purchase::completed(new, calculate(2999, 1000, 0).unwrap()).unwrap()
    }

    #[test]
    fn checkout_request_uses_camel_case() {
        let json = r#"{"contentId":"abc","successUrl":"https://a","cancelUrl":"https://b"}"#;
        let req: CreateCheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.content_id, "abc");
        assert_eq!(req.success_url, "https://a");
    }

    #[test]
    fn purchase_response_serializes_split() {
        let value = serde_json::to_value(PurchaseResponse::from(purchase())).unwrap();
        assert_eq!(value["amountPaidCents"], 2999);
        assert_eq!(value["platformFeeCents"], 300);
        assert_eq!(value["creatorPayoutCents"], 2699);
        assert_eq!(value["status"], "completed");
        assert!(value.get("paymentReference").is_none());
    }

    #[test]
    fn error_response_omits_empty_details() {
        let value = serde_json::to_value(ErrorResponse::new("FORBIDDEN", "no")).unwrap();
        assert!(value.get("details").is_none());
    }
}
