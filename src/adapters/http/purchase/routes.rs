//! Axum router configuration for purchase endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, get_purchase, handle_stripe_webhook, list_purchases, verify_purchase,
    PurchaseAppState,
};

/// Customer-facing purchase routes.
///
/// # Routes (require `X-User-Id`)
/// - `GET /` - Paginated purchase history
/// - `POST /checkout` - Start checkout
/// - `GET /verify/:content_id` - Ownership check
/// - `GET /:id` - Single purchase
pub fn purchase_routes() -> Router<PurchaseAppState> {
    Router::new()
        .route("/", get(list_purchases))
        .route("/checkout", post(create_checkout))
        .route("/verify/:content_id", get(verify_purchase))
        .route("/:id", get(get_purchase))
}

/// Gateway callbacks. Authenticated by signature, not by user.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<PurchaseAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Combined router, suitable for mounting at `/api`.
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api", purchase_router())
///     .with_state(state);
/// ```
pub fn purchase_router() -> Router<PurchaseAppState> {
    Router::new()
        .nest("/purchases", purchase_routes())
        .nest("/webhooks", webhook_routes())
}
