//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_CHECKOUT_EXPIRY_MINUTES: i64 = 30;
/// One minute under the gateway's 24 hour cap, leaving room for the
/// expiry margin added at checkout.
const MAX_CHECKOUT_EXPIRY_MINUTES: i64 = 24 * 60 - 1;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Override for the Stripe API host (stripe-mock, proxies)
    pub stripe_api_base_url: Option<String>,

    /// Reject webhook events whose `livemode` flag is false
    #[serde(default)]
    pub require_livemode: bool,

    /// Lifetime of a hosted checkout session
    #[serde(default = "default_checkout_expiry")]
    pub checkout_expiry_minutes: i64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if !api_key.starts_with("sk_") && !api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if let Some(url) = &self.stripe_api_base_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidStripeBaseUrl);
            }
        }
        if !(MIN_CHECKOUT_EXPIRY_MINUTES..=MAX_CHECKOUT_EXPIRY_MINUTES)
            .contains(&self.checkout_expiry_minutes)
        {
            return Err(ValidationError::InvalidCheckoutExpiry);
        }
        Ok(())
    }
}

fn default_checkout_expiry() -> i64 {
    MIN_CHECKOUT_EXPIRY_MINUTES
}
