//! GetPurchaseHistoryHandler - Query handler for a customer's purchases.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{ContentId, UserId};
use crate::domain::purchase::{Purchase, PurchaseError, PurchaseStatus};
use crate::ports::{ListOptions, PurchaseReader};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query for one page of the requester's purchases.
///
/// `page` is 1-based. Missing or zero values fall back to the first page and
/// the default page size; oversized limits are clamped.
#[derive(Debug, Clone, Default)]
pub struct GetPurchaseHistoryQuery {
    pub customer_id: Option<UserId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<PurchaseStatus>,
    pub content_id: Option<ContentId>,
}

/// Paginated purchase history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryPage {
    pub items: Vec<Purchase>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_more: bool,
}

pub struct GetPurchaseHistoryHandler {
    reader: Arc<dyn PurchaseReader>,
}

impl GetPurchaseHistoryHandler {
    pub fn new(reader: Arc<dyn PurchaseReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetPurchaseHistoryQuery,
    ) -> Result<PurchaseHistoryPage, PurchaseError> {
        let customer_id = query
            .customer_id
            .ok_or_else(|| PurchaseError::validation("customer_id", "customer is required"))?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut options = ListOptions::paginated(page, limit);
        if let Some(status) = query.status {
            options = options.with_status(status);
        }
        if let Some(content_id) = query.content_id {
            options = options.with_content(content_id);
        }

        let list = self.reader.list_by_customer(&customer_id, &options).await?;

        let total_pages = list.total.div_ceil(u64::from(limit));
        let has_more = u64::from(options.offset) + (list.items.len() as u64) < list.total;

        Ok(PurchaseHistoryPage {
            items: list.items,
            total: list.total,
            page,
            limit,
            total_pages,
            has_more,
        })
    }
}
