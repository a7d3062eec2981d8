//! HTTP adapter for purchase endpoints.
//!
//! Exposes the purchase pipeline via REST API:
//! - `POST /api/purchases/checkout` - Start checkout for a content item
//! - `GET /api/purchases` - Purchase history
//! - `GET /api/purchases/:id` - Single purchase
//! - `GET /api/purchases/verify/:content_id` - Ownership check
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{
    AuthenticatedUser, PurchaseApiError, PurchaseAppState, WebhookApiError, SIGNATURE_HEADER,
    USER_ID_HEADER,
};
pub use routes::{purchase_router, purchase_routes, webhook_routes};
