//! Purchase command and query handlers.

mod complete_purchase;
mod create_checkout_session;
mod get_purchase;
mod get_purchase_history;
mod handle_payment_webhook;
mod verify_purchase;

pub use complete_purchase::{
    CompletePurchaseCommand, CompletePurchaseHandler, CompletePurchaseResult,
};
pub use create_checkout_session::{
    CheckoutPolicy, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, MIN_SESSION_TTL_MINUTES, SESSION_EXPIRY_MARGIN_SECS,
};
pub use get_purchase::{GetPurchaseHandler, GetPurchaseQuery};
pub use get_purchase_history::{
    GetPurchaseHistoryHandler, GetPurchaseHistoryQuery, PurchaseHistoryPage, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};
pub use verify_purchase::{VerifyPurchaseHandler, VerifyPurchaseQuery};
