//! HTTP handlers for purchase endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Json, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::{
    CheckoutPolicy, CompletePurchaseHandler, CreateCheckoutSessionCommand,
    CreateCheckoutSessionHandler, GetPurchaseHandler, GetPurchaseHistoryHandler,
    GetPurchaseHistoryQuery, GetPurchaseQuery, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, VerifyPurchaseHandler, VerifyPurchaseQuery, WebhookOutcome,
};
use crate::domain::foundation::{ContentId, PurchaseId, UserId, ValidationError};
use crate::domain::payment::{WebhookError, WebhookVerifier};
use crate::domain::purchase::{PurchaseError, PurchaseStatus};
use crate::ports::{
    ContentReader, FeeScheduleSource, PaymentGateway, PurchaseReader, PurchaseRepository,
};

use super::dto::{
    CheckoutResponse, CreateCheckoutRequest, ErrorResponse, PurchaseHistoryParams,
    PurchaseHistoryResponse, PurchaseResponse, VerifyPurchaseResponse, WebhookAckResponse,
};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const USER_ID_HEADER: &str = "X-User-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct PurchaseAppState {
    pub content_reader: Arc<dyn ContentReader>,
    pub purchase_repository: Arc<dyn PurchaseRepository>,
    pub purchase_reader: Arc<dyn PurchaseReader>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub fee_source: Arc<dyn FeeScheduleSource>,
    pub webhook_verifier: Arc<WebhookVerifier>,
    pub checkout_policy: CheckoutPolicy,
}

impl PurchaseAppState {
    pub fn create_checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.content_reader.clone(),
            self.purchase_reader.clone(),
            self.payment_gateway.clone(),
            self.checkout_policy.clone(),
        )
    }

    pub fn complete_purchase_handler(&self) -> CompletePurchaseHandler {
        CompletePurchaseHandler::new(
            self.purchase_repository.clone(),
            self.content_reader.clone(),
            self.fee_source.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.webhook_verifier.clone(),
            Arc::new(self.complete_purchase_handler()),
        )
    }

    pub fn verify_purchase_handler(&self) -> VerifyPurchaseHandler {
        VerifyPurchaseHandler::new(self.purchase_reader.clone())
    }

    pub fn get_purchase_handler(&self) -> GetPurchaseHandler {
        GetPurchaseHandler::new(self.purchase_reader.clone())
    }

    pub fn purchase_history_handler(&self) -> GetPurchaseHistoryHandler {
        GetPurchaseHistoryHandler::new(self.purchase_reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Customer identity asserted by the upstream authentication layer.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

fn parse_content_id(field: &str, raw: &str) -> Result<ContentId, PurchaseError> {
    raw.trim()
        .parse()
        .map_err(|_| PurchaseError::validation(field, "must be a UUID"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/purchases - Paginated purchase history for the caller
pub async fn list_purchases(
    State(state): State<PurchaseAppState>,
    user: AuthenticatedUser,
    Query(params): Query<PurchaseHistoryParams>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let status = params
        .status
        .as_deref()
        .map(PurchaseStatus::parse)
        .transpose()?;
    let content_id = params
        .content_id
        .as_deref()
        .map(|raw| parse_content_id("contentId", raw))
        .transpose()?;

    let query = GetPurchaseHistoryQuery {
        customer_id: Some(user.user_id),
        page: params.page,
        limit: params.limit,
        status,
        content_id,
    };

    let page = state.purchase_history_handler().handle(query).await?;
    Ok(Json(PurchaseHistoryResponse::from(page)))
}

/// GET /api/purchases/:id - Single purchase owned by the caller
pub async fn get_purchase(
    State(state): State<PurchaseAppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let purchase_id: PurchaseId = id
        .parse()
        .map_err(|_| PurchaseError::validation("id", "must be a UUID"))?;

    let purchase = state
        .get_purchase_handler()
        .handle(GetPurchaseQuery {
            purchase_id,
            customer_id: user.user_id,
        })
        .await?;

    Ok(Json(PurchaseResponse::from(purchase)))
}

/// GET /api/purchases/verify/:content_id - Ownership check
pub async fn verify_purchase(
    State(state): State<PurchaseAppState>,
    user: AuthenticatedUser,
    Path(content_id): Path<String>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let content_id = parse_content_id("content_id", &content_id)?;

    let purchased = state
        .verify_purchase_handler()
        .handle(VerifyPurchaseQuery {
            customer_id: user.user_id,
            content_id,
        })
        .await?;

    Ok(Json(VerifyPurchaseResponse { purchased }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/purchases/checkout - Start checkout for a content item
pub async fn create_checkout(
    State(state): State<PurchaseAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let cmd = CreateCheckoutSessionCommand {
        customer_id: user.user_id,
        content_id: parse_content_id("contentId", &request.content_id)?,
        success_url: request.success_url,
        cancel_url: request.cancel_url,
    };

    let result = state.create_checkout_handler().handle(cmd).await?;

    let response = CheckoutResponse {
        session_url: result.session_url,
        session_id: result.session_id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes; it must reach the verifier unparsed.
pub async fn handle_stripe_webhook(
    State(state): State<PurchaseAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    match outcome {
        WebhookOutcome::PurchaseCompleted {
            purchase_id,
            newly_created,
        } => tracing::info!(%purchase_id, newly_created, "Webhook processed"),
        WebhookOutcome::Acknowledged | WebhookOutcome::Ignored => {
            tracing::debug!(outcome = ?outcome, "Webhook acknowledged")
        }
    }

    Ok(Json(WebhookAckResponse { received: true }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts purchase errors to HTTP responses.
#[derive(Debug)]
pub struct PurchaseApiError(pub PurchaseError);

impl From<PurchaseError> for PurchaseApiError {
    fn from(err: PurchaseError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for PurchaseApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl PurchaseApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            PurchaseError::Validation { .. } | PurchaseError::ContentNotPurchasable { .. } => {
                StatusCode::BAD_REQUEST
            }
            PurchaseError::ContentNotFound(_) | PurchaseError::PurchaseNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PurchaseError::AlreadyPurchased(_) => StatusCode::CONFLICT,
            PurchaseError::SignatureInvalid => StatusCode::UNAUTHORIZED,
            PurchaseError::Forbidden => StatusCode::FORBIDDEN,
            PurchaseError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            PurchaseError::PaymentProcessing(_)
            | PurchaseError::RevenueCalculation(_)
            | PurchaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PurchaseApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.0.code().to_string();

        let body = if status.is_server_error() {
            tracing::error!(error = %self.0, "Purchase request failed");
            ErrorResponse::new(code, "An internal error occurred")
        } else {
            let body = ErrorResponse::new(code, self.0.to_string());
            match &self.0 {
                PurchaseError::ContentNotPurchasable { reason, .. } => {
                    body.with_details(serde_json::json!({ "reason": reason }))
                }
                PurchaseError::Validation { field, .. } => {
                    body.with_details(serde_json::json!({ "field": field }))
                }
                _ => body,
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Webhook failures; the status code drives gateway redelivery.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = if status.is_server_error() {
            "Webhook processing failed".to_string()
        } else {
            self.0.to_string()
        };
        let body = ErrorResponse::new(self.0.code(), message);
        (status, Json(body)).into_response()
    }
}
