//! Read-only content snapshot and purchasability rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ContentId, OrganizationId, Timestamp, UserId};

/// Publication state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ContentStatus::Draft),
            "published" => Some(ContentStatus::Published),
            "archived" => Some(ContentStatus::Archived),
            _ => None,
        }
    }
}

/// Why a content item cannot be sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotPurchasableReason {
    Free,
    NotPublished,
    Deleted,
    NoPrice,
    NoOrganization,
}

impl NotPurchasableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotPurchasableReason::Free => "free",
            NotPurchasableReason::NotPublished => "not_published",
            NotPurchasableReason::Deleted => "deleted",
            NotPurchasableReason::NoPrice => "no_price",
            NotPurchasableReason::NoOrganization => "no_organization",
        }
    }
}

impl fmt::Display for NotPurchasableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a catalog item as seen by the purchase pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub status: ContentStatus,
    pub price_cents: Option<i64>,
    pub organization_id: Option<OrganizationId>,
    pub creator_id: UserId,
    pub deleted_at: Option<Timestamp>,
}

/// Content that passed every purchasability rule.
///
/// Only obtainable through [`Content::check_purchasable`], so holding one
/// means the organization and a positive price are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasableContent {
    pub content_id: ContentId,
    pub title: String,
    pub organization_id: OrganizationId,
    pub creator_id: UserId,
    pub price_cents: i64,
}

impl Content {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies the checkout rules in order; the first violation wins.
    pub fn check_purchasable(&self) -> Result<PurchasableContent, NotPurchasableReason> {
        if self.is_deleted() {
            return Err(NotPurchasableReason::Deleted);
        }
        if self.status != ContentStatus::Published {
            return Err(NotPurchasableReason::NotPublished);
        }
        let organization_id = self
            .organization_id
            .ok_or(NotPurchasableReason::NoOrganization)?;
        let price_cents = match self.price_cents {
            None => return Err(NotPurchasableReason::NoPrice),
            Some(0) => return Err(NotPurchasableReason::Free),
            Some(p) if p < 0 => return Err(NotPurchasableReason::NoPrice),
            Some(p) => p,
        };

        Ok(PurchasableContent {
            content_id: self.id,
            title: self.title.clone(),
            organization_id,
            creator_id: self.creator_id.clone(),
            price_cents,
        })
    }
}

#[cfg(test)]
pub(crate) fn published_content(price_cents: Option<i64>) -> Content {
    Content {
        id: ContentId::new(),
        title: "Field Recording Masterclass".to_string(),
        status: ContentStatus::Published,
        price_cents,
        organization_id: Some(OrganizationId::new()),
        creator_id: UserId::new("creator-1").unwrap(),
        deleted_at: None,
    }
}
