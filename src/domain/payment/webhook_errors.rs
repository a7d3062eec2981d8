//! Webhook error types for payment gateway callbacks.
//!
//! Every variant maps to an HTTP status that drives the gateway's redelivery:
//! 2xx acknowledges, 4xx stops retries, 5xx asks for redelivery.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::purchase::PurchaseError;

/// Errors that occur while verifying or processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signing secret is configured; nothing can be trusted.
    #[error("Webhook signing secret is not configured")]
    MissingSecret,

    /// The request carried no signature header.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(&'static str),

    /// Webhook timestamp is older than the replay window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the verified payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A test-mode event reached a deployment that only accepts live events.
    #[error("Test mode events are not accepted")]
    LivemodeMismatch,

    /// Required metadata field missing from the checkout session.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Required field missing from the webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The verified event could not be fulfilled.
    #[error(transparent)]
    Processing(#[from] PurchaseError),
}

impl WebhookError {
    /// True for failures of the authenticity check itself.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSecret
                | WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::MalformedSignature(_)
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Returns true if the gateway should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        match self {
            WebhookError::Processing(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Misconfiguration - let the gateway retry once the secret is set
            WebhookError::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,

            // Auth failures - don't retry
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => StatusCode::UNAUTHORIZED,

            // Bad request - don't retry
            WebhookError::ParseError(_)
            | WebhookError::LivemodeMismatch
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Processing(PurchaseError::Validation { .. }) => StatusCode::BAD_REQUEST,

            // Server errors - will retry
            WebhookError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::MissingSecret => "WEBHOOK_NOT_CONFIGURED",
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => "INVALID_WEBHOOK_SIGNATURE",
            WebhookError::ParseError(_)
            | WebhookError::LivemodeMismatch
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => "INVALID_WEBHOOK_PAYLOAD",
            WebhookError::Processing(_) => "WEBHOOK_PROCESSING_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(format!("{}", WebhookError::InvalidSignature), "Invalid signature");
    }

    #[test]
    fn missing_metadata_displays_field_name() {
        let err = WebhookError::MissingMetadata("content_id");
        assert_eq!(format!("{}", err), "Missing metadata: content_id");
    }

    #[test]
    fn processing_error_is_transparent() {
        let err = WebhookError::from(PurchaseError::payment_processing("no organization"));
        assert_eq!(format!("{}", err), "Payment processing failed: no organization");
    }

    // ══════════════════════════════════════════════════════════════
    // Classification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_are_verification_failures() {
        assert!(WebhookError::MissingSecret.is_verification_failure());
        assert!(WebhookError::MissingSignature.is_verification_failure());
        assert!(WebhookError::InvalidSignature.is_verification_failure());
        assert!(WebhookError::TimestampOutOfRange.is_verification_failure());
        assert!(WebhookError::MalformedSignature("missing v1 signature").is_verification_failure());
        assert!(!WebhookError::ParseError("bad".into()).is_verification_failure());
    }

    #[test]
    fn internal_processing_error_is_retryable() {
        let err = WebhookError::from(PurchaseError::internal("connection reset"));
        assert!(err.is_retryable());
    }

    #[test]
    fn signature_error_is_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verification_failures_return_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::MissingSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::InvalidTimestamp.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::MalformedSignature("invalid header format").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::MalformedSignature("missing timestamp").code(),
            "INVALID_WEBHOOK_SIGNATURE"
        );
    }

    #[test]
    fn malformed_payload_returns_bad_request() {
        assert_eq!(
            WebhookError::MissingField("amount_total").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::LivemodeMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn fatal_processing_error_returns_server_error() {
        let err = WebhookError::from(PurchaseError::payment_processing("content missing"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_secret_returns_server_error() {
        assert_eq!(
            WebhookError::MissingSecret.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
