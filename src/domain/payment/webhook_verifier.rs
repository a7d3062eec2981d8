//! Payment gateway webhook signature verification.
//!
//! Implements Stripe's scheme: HMAC-SHA256 over `"{timestamp}.{raw body}"`,
//! compared in constant time, with the timestamp bound to a 5 minute window
//! to deter replay. Verification runs on the exact request bytes; nothing is
//! parsed until the signature has been accepted.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::gateway_event::{GatewayEvent, StripeEvent};
use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// Every v1 signature present. Stripe sends several while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>][,v0=<legacy>]`
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(WebhookError::MalformedSignature("invalid header format"))?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| WebhookError::MalformedSignature("invalid timestamp"))?,
                    );
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value.trim()).map_err(|_| {
                        WebhookError::MalformedSignature("invalid v1 signature hex")
                    })?);
                }
                _ => {
                    // v0 and unknown schemes are never trusted
                }
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedSignature("missing timestamp"))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::MalformedSignature("missing v1 signature"));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for gateway webhook signatures.
pub struct WebhookVerifier {
    secret: SecretString,
    require_livemode: bool,
}

impl WebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            require_livemode: false,
        }
    }

    /// Reject test-mode events.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Verifies the signature and returns the typed event.
    ///
    /// # Verification Steps
    ///
    /// 1. Refuse to run without a configured secret
    /// 2. Parse the signature header
    /// 3. Validate timestamp is within acceptable range
    /// 4. Compare against HMAC-SHA256 of the raw payload in constant time
    /// 5. Parse the JSON payload and enforce livemode
    /// 6. Convert into a [`GatewayEvent`]
    ///
    /// Any failure returns an error; there is no partially trusted result.
    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<GatewayEvent, WebhookError> {
        let event = self.verify_envelope(payload, signature_header)?;
        GatewayEvent::try_from(&event)
    }

    /// Steps 1 to 5 of [`verify`](Self::verify).
    pub fn verify_envelope(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_signature(payload, signature_header)
            .map_err(|err| {
                tracing::warn!(
                    reason = %err,
                    payload_len = payload.len(),
                    "Webhook signature verification failed"
                );
                err
            })?;

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if self.require_livemode && !event.is_live() {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::LivemodeMismatch);
        }

        Ok(event)
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), WebhookError> {
        let secret = self.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(WebhookError::MissingSecret);
        }

        let header = signature_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(WebhookError::MissingSignature)?;
        let header = SignatureHeader::parse(header)?;

        validate_timestamp(header.timestamp, chrono::Utc::now().timestamp())?;

        let expected = compute_signature(secret, header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));

        if !matched {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}

/// Validates that the timestamp is within acceptable bounds of `now`.
fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    // The header is untrusted at this point; any i64 may arrive.
    let age = now
        .checked_sub(timestamp)
        .ok_or(WebhookError::TimestampOutOfRange)?;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }

    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a Stripe-Signature header value for `payload`.
///
/// Used to sign fixtures and local replays of gateway events.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}
