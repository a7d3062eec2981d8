//! GetPurchaseHandler - Query handler for a single purchase.

use std::sync::Arc;

use crate::domain::foundation::{PurchaseId, UserId};
use crate::domain::purchase::{Purchase, PurchaseError};
use crate::ports::PurchaseReader;

#[derive(Debug, Clone)]
pub struct GetPurchaseQuery {
    pub purchase_id: PurchaseId,
    pub customer_id: UserId,
}

pub struct GetPurchaseHandler {
    reader: Arc<dyn PurchaseReader>,
}

impl GetPurchaseHandler {
    pub fn new(reader: Arc<dyn PurchaseReader>) -> Self {
        Self { reader }
    }

    /// Returns the purchase if the requester owns it.
    ///
    /// An unknown id is `PurchaseNotFound`; someone else's purchase is
    /// `Forbidden`.
    pub async fn handle(&self, query: GetPurchaseQuery) -> Result<Purchase, PurchaseError> {
        let purchase = self
            .reader
            .find_by_id(&query.purchase_id)
            .await?
            .ok_or(PurchaseError::PurchaseNotFound(query.purchase_id))?;

        if !purchase.is_owned_by(&query.customer_id) {
            tracing::warn!(
                purchase_id = %query.purchase_id,
                requester = %query.customer_id,
                "Purchase access denied"
            );
            return Err(PurchaseError::Forbidden);
        }

        Ok(purchase)
    }
}
