//! Stripe checkout adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API.
//! Sessions are created in one-time `payment` mode with inline `price_data`,
//! so no Stripe product catalogue is required.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(10));
//! let gateway = StripeCheckoutGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::Timestamp;
use crate::ports::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};

use super::api_types::{StripeCheckoutSession, StripeErrorResponse};

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe implementation of [`PaymentGateway`].
pub struct StripeCheckoutGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCheckoutGateway {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Form parameters for `POST /v1/checkout/sessions`.
///
/// Identifying data travels in `metadata` and comes back on the completion
/// webhook.
fn checkout_params(request: &CheckoutSessionRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            request.currency.as_str().to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.title.clone(),
        ),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("expires_at", request.expires_at.as_unix_secs().to_string()),
        ("client_reference_id", request.customer_id.to_string()),
        ("metadata[customer_id]", request.customer_id.to_string()),
        ("metadata[content_id]", request.content_id.to_string()),
        ("metadata[organization_id]", request.organization_id.to_string()),
        ("metadata[creator_id]", request.creator_id.to_string()),
    ]
}

/// Maps a non-2xx Stripe response to a [`PaymentError`].
fn error_from_response(status: StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| r.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status.as_u16()));

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        s if s.is_client_error() => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match parsed.and_then(|r| r.error.code.or(Some(r.error.error_type))) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckoutGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &body);
            tracing::error!(
                status = status.as_u16(),
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe create_checkout_session failed"
            );
            return Err(error);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let redirect = session.url.ok_or_else(|| {
            PaymentError::provider(format!("Checkout session {} has no URL", session.id))
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url: redirect,
            expires_at: session.expires_at.and_then(Timestamp::from_unix_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContentId, OrganizationId, UserId};
    use crate::domain::purchase::Currency;

    fn request() -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            content_id: ContentId::new(),
            customer_id: UserId::new("customer-42").unwrap(),
            organization_id: OrganizationId::new(),
            creator_id: UserId::new("creator-7").unwrap(),
            title: "Modular Synthesis Basics".to_string(),
            amount_cents: 2999,
            currency: Currency::usd(),
            success_url: "https://example.com/ok".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
            expires_at: Timestamp::from_unix_secs(1_704_070_800).unwrap(),
        }
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    // ══════════════════════════════════════════════════════════════
    // Request Encoding Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn params_use_one_time_payment_mode() {
        let params = checkout_params(&request());
        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("1"));
    }

    #[test]
    fn params_carry_inline_price() {
        let params = checkout_params(&request());
        assert_eq!(
            param(&params, "line_items[0][price_data][unit_amount]"),
            Some("2999")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("Modular Synthesis Basics")
        );
    }

    #[test]
    fn params_carry_identifying_metadata() {
        let req = request();
        let params = checkout_params(&req);
        assert_eq!(param(&params, "metadata[customer_id]"), Some("customer-42"));
        assert_eq!(
            param(&params, "metadata[content_id]"),
            Some(req.content_id.to_string().as_str())
        );
        assert_eq!(
            param(&params, "metadata[organization_id]"),
            Some(req.organization_id.to_string().as_str())
        );
        assert_eq!(param(&params, "metadata[creator_id]"), Some("creator-7"));
        assert_eq!(param(&params, "expires_at"), Some("1704070800"));
    }

    // ══════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = error_from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"type":"invalid_request_error","message":"Invalid API Key provided"}}"#,
        );
        assert_eq!(err.code, PaymentErrorCode::AuthenticationError);
        assert!(!err.retryable);
        assert_eq!(err.message, "Invalid API Key provided");
    }

    #[test]
    fn rate_limit_is_retryable() {
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.code, PaymentErrorCode::RateLimitExceeded);
        assert!(err.retryable);
    }

    #[test]
    fn bad_request_keeps_provider_code() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"type":"invalid_request_error","code":"parameter_invalid_integer","message":"Invalid integer"}}"#,
        );
        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("parameter_invalid_integer"));
    }

    #[test]
    fn server_error_with_unparseable_body() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert!(err.retryable);
        assert!(err.message.contains("502"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = StripeConfig::new(SecretString::new("sk_test".to_string()))
            .with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }
}
