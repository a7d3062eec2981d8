//! Mock payment gateway for testing and local development.
//!
//! Supports:
//! - Call tracking
//! - Error injection
//! - Deterministic session ids

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_next(PaymentError::network("timeout"));
/// assert!(gateway.create_checkout_session(request).await.is_err());
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    requests: Vec<CheckoutSessionRequest>,
    next_error: Option<PaymentError>,
    fail_always: Option<PaymentError>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails with `error`.
    pub fn failing(error: PaymentError) -> Self {
        let mock = Self::new();
        mock.state().fail_always = Some(error);
        mock
    }

    /// Fail only the next call.
    pub fn fail_next(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        let expires_at = request.expires_at;
        state.requests.push(request);

        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        if let Some(err) = &state.fail_always {
            return Err(err.clone());
        }

        let id = format!("cs_mock_{}", state.requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
            expires_at: Some(expires_at),
        })
    }
}
