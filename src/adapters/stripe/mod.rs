//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for hosted checkout. Webhook
//! verification lives in the domain (`domain::payment`) since it needs no
//! network access.
//!
//! # Configuration
//!
//! Required settings:
//! - `CREATOR_COMMERCE__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `CREATOR_COMMERCE__PAYMENT__STRIPE_WEBHOOK_SECRET`: Webhook signing secret (whsec_...)

mod api_types;
mod mock_payment_gateway;
mod stripe_adapter;

pub use api_types::{StripeCheckoutSession, StripeErrorBody, StripeErrorResponse};
pub use mock_payment_gateway::MockPaymentGateway;
pub use stripe_adapter::{StripeCheckoutGateway, StripeConfig, DEFAULT_API_BASE_URL};
