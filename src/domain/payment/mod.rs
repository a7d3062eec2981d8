//! Payment gateway callbacks: signature verification and typed events.

mod gateway_event;
mod webhook_errors;
mod webhook_verifier;

pub use gateway_event::{
    CheckoutCompleted, CompletionMetadata, GatewayEvent, PaymentStatus, StripeEvent,
    StripeEventData, CHECKOUT_SESSION_COMPLETED, CHECKOUT_SESSION_EXPIRED,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, WebhookVerifier};
