//! Purchase-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | ContentNotFound | 404 |
//! | ContentNotPurchasable | 400 |
//! | AlreadyPurchased | 409 |
//! | SignatureInvalid | 401 |
//! | PaymentGateway | 502 |
//! | PurchaseNotFound | 404 |
//! | Forbidden | 403 |
//! | PaymentProcessing | 500 |
//! | RevenueCalculation | 500 |
//! | Internal | 500 |

use thiserror::Error;

use crate::domain::content::NotPurchasableReason;
use crate::domain::foundation::{ContentId, DomainError, ErrorCode, PurchaseId, ValidationError};

use super::revenue::RevenueSplitError;

/// Errors surfaced by the purchase pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Content not found: {0}")]
    ContentNotFound(ContentId),

    #[error("Content {content_id} is not purchasable: {reason}")]
    ContentNotPurchasable {
        content_id: ContentId,
        reason: NotPurchasableReason,
    },

    #[error("Content {0} has already been purchased")]
    AlreadyPurchased(ContentId),

    #[error("Invalid webhook signature")]
    SignatureInvalid,

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Purchase not found: {0}")]
    PurchaseNotFound(PurchaseId),

    #[error("You do not have access to this purchase")]
    Forbidden,

    /// Completion cannot proceed; the event must not be fulfilled.
    #[error("Payment processing failed: {0}")]
    PaymentProcessing(String),

    /// The revenue split did not balance. Always a defect.
    #[error("Revenue calculation failed: {0}")]
    RevenueCalculation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PurchaseError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PurchaseError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_purchasable(content_id: ContentId, reason: NotPurchasableReason) -> Self {
        PurchaseError::ContentNotPurchasable { content_id, reason }
    }

    pub fn payment_processing(message: impl Into<String>) -> Self {
        PurchaseError::PaymentProcessing(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PurchaseError::Internal(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PurchaseError::Validation { .. } => ErrorCode::ValidationFailed,
            PurchaseError::ContentNotFound(_) => ErrorCode::ContentNotFound,
            PurchaseError::ContentNotPurchasable { .. } => ErrorCode::ContentNotPurchasable,
            PurchaseError::AlreadyPurchased(_) => ErrorCode::AlreadyPurchased,
            PurchaseError::SignatureInvalid => ErrorCode::InvalidWebhookSignature,
            PurchaseError::PaymentGateway(_) => ErrorCode::PaymentGatewayError,
            PurchaseError::PurchaseNotFound(_) => ErrorCode::PurchaseNotFound,
            PurchaseError::Forbidden => ErrorCode::Forbidden,
            PurchaseError::PaymentProcessing(_) => ErrorCode::PaymentProcessingError,
            PurchaseError::RevenueCalculation(_) => ErrorCode::RevenueCalculationError,
            PurchaseError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurchaseError::PaymentGateway(_) | PurchaseError::Internal(_)
        )
    }
}

impl From<DomainError> for PurchaseError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => PurchaseError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::PaymentGatewayError => PurchaseError::PaymentGateway(err.message),
            _ => PurchaseError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for PurchaseError {
    fn from(err: ValidationError) -> Self {
        PurchaseError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<RevenueSplitError> for PurchaseError {
    fn from(err: RevenueSplitError) -> Self {
        if err.is_defect() {
            PurchaseError::RevenueCalculation(err.to_string())
        } else {
            PurchaseError::PaymentProcessing(err.to_string())
        }
    }
}

impl From<PurchaseError> for DomainError {
    fn from(err: PurchaseError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
