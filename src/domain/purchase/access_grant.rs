//! Content access grants derived from purchases.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentId, Timestamp, UserId};

use super::Purchase;

/// How the customer obtained access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    Purchased,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Purchased => "purchased",
        }
    }
}

/// Proof that a customer may consume a content item.
///
/// Unique per (customer, content). Created only alongside the purchase it
/// derives from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAccessGrant {
    pub customer_id: UserId,
    pub content_id: ContentId,
    pub access_type: AccessType,
    pub expires_at: Option<Timestamp>,
    pub granted_at: Timestamp,
}

impl ContentAccessGrant {
    /// Permanent access for the purchase's customer and content.
    pub fn for_purchase(purchase: &Purchase) -> Self {
        Self {
            customer_id: purchase.customer_id.clone(),
            content_id: purchase.content_id,
            access_type: AccessType::Purchased,
            expires_at: None,
            granted_at: purchase.purchased_at.unwrap_or(purchase.created_at),
        }
    }

    pub fn is_active_at(&self, at: &Timestamp) -> bool {
        match &self.expires_at {
            Some(expires_at) => at.is_before(expires_at),
            None => true,
        }
    }
}
