//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod purchase;

pub use purchase::{
    // Commands
    CompletePurchaseCommand, CompletePurchaseHandler, CompletePurchaseResult,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
    // Queries
    GetPurchaseHandler, GetPurchaseQuery,
    GetPurchaseHistoryHandler, GetPurchaseHistoryQuery, PurchaseHistoryPage,
    VerifyPurchaseHandler, VerifyPurchaseQuery,
    // Settings
    CheckoutPolicy,
};
