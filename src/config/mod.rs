//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CREATOR_COMMERCE` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use creator_commerce::config::AppConfig;
//!
//! # fn main() -> Result<(), creator_commerce::config::ConfigError> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! println!("Server running on {}", config.server.socket_addr()?);
//! # Ok(())
//! # }
//! ```

mod checkout;
mod database;
mod error;
mod fees;
mod payment;
mod server;

pub use checkout::CheckoutConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use fees::FeesConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::application::CheckoutPolicy;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment gateway configuration (Stripe)
    pub payment: PaymentConfig,

    /// Hosted checkout settings
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Default revenue split
    #[serde(default)]
    pub fees: FeesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CREATOR_COMMERCE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CREATOR_COMMERCE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CREATOR_COMMERCE__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CREATOR_COMMERCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.checkout.validate(self.is_production())?;
        self.fees.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Checkout rules derived from the `checkout` and `payment` sections.
    pub fn checkout_policy(&self) -> Result<CheckoutPolicy, ValidationError> {
        Ok(CheckoutPolicy {
            redirect_allow_list: self.checkout.redirect_allow_list(),
            currency: self.checkout.currency()?,
            session_ttl_minutes: self.payment.checkout_expiry_minutes,
        })
    }
}
