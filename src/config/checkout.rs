//! Checkout configuration

use serde::Deserialize;

use crate::domain::purchase::{Currency, RedirectAllowList};

use super::error::ValidationError;

/// Hosted checkout settings
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Trusted redirect hosts (comma-separated). Subdomains are allowed too.
    pub allowed_redirect_hosts: Option<String>,

    /// Settlement currency for every session
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl CheckoutConfig {
    pub fn redirect_allow_list(&self) -> RedirectAllowList {
        RedirectAllowList::new(
            self.allowed_redirect_hosts
                .as_deref()
                .unwrap_or_default()
                .split(','),
        )
    }

    pub fn currency(&self) -> Result<Currency, ValidationError> {
        Currency::new(&self.currency)
            .map_err(|_| ValidationError::InvalidCurrency(self.currency.clone()))
    }

    /// An empty allow-list rejects every redirect, which is only tolerated
    /// outside production.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        self.currency()?;
        if production && self.redirect_allow_list().is_empty() {
            return Err(ValidationError::EmptyRedirectAllowList);
        }
        Ok(())
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            allowed_redirect_hosts: None,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}
