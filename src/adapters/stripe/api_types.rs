//! Stripe API response types.
//!
//! Only the fields the adapter reads are modelled; everything else is ignored.

use serde::Deserialize;

/// Checkout session returned by `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted payment page. Absent once the session is complete or expired.
    pub url: Option<String>,

    /// Unix timestamp at which the session expires.
    pub expires_at: Option<i64>,

    /// Session status (open, complete, expired).
    #[serde(default)]
    pub status: Option<String>,
}

/// Error envelope returned for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    /// Error category (api_error, card_error, invalid_request_error, ...).
    #[serde(rename = "type")]
    pub error_type: String,

    /// Short machine-readable code, when Stripe provides one.
    pub code: Option<String>,

    pub message: Option<String>,

    /// Request parameter the error relates to.
    pub param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_parses_with_minimal_fields() {
        let json = r#"{"id":"cs_test_1","object":"checkout.session","url":"https://checkout.stripe.com/c/pay/cs_test_1","expires_at":1704070800}"#;
        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "cs_test_1");
        assert!(session.url.unwrap().contains("cs_test_1"));
        assert_eq!(session.expires_at, Some(1704070800));
        assert_eq!(session.status, None);
    }

    #[test]
    fn error_envelope_parses() {
        let json = r#"{"error":{"type":"invalid_request_error","code":"parameter_invalid_integer","message":"Invalid integer","param":"line_items[0][price_data][unit_amount]"}}"#;
        let err: StripeErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(err.error.error_type, "invalid_request_error");
        assert_eq!(err.error.code.as_deref(), Some("parameter_invalid_integer"));
        assert!(err.error.param.unwrap().contains("unit_amount"));
    }
}
