//! PostgreSQL implementation of PurchaseReader.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{ContentId, DomainError, PurchaseId, UserId};
use crate::domain::purchase::{Purchase, PurchaseStatus};
use crate::ports::{ListOptions, PurchaseList, PurchaseReader};

use super::purchase_rows::{row_to_purchase, PURCHASE_COLUMNS};

/// Optional filters bind as NULL and drop out of the predicate.
const CUSTOMER_FILTER: &str = r#"
    WHERE customer_id = $1
      AND ($2::text IS NULL OR status = $2)
      AND ($3::uuid IS NULL OR content_id = $3)
"#;

/// PostgreSQL implementation of PurchaseReader.
#[derive(Clone)]
pub struct PostgresPurchaseReader {
    pool: PgPool,
}

impl PostgresPurchaseReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_by_customer(
        &self,
        customer_id: &UserId,
        options: &ListOptions,
    ) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM purchases {}", CUSTOMER_FILTER);
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(customer_id.as_str())
            .bind(options.status.map(|s| s.as_str()))
            .bind(options.content_id.map(|c| *c.as_uuid()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to count purchases: {}", e)))?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl PurchaseReader for PostgresPurchaseReader {
    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError> {
        let sql = format!("SELECT {} FROM purchases WHERE id = $1", PURCHASE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch purchase: {}", e)))?;

        row.map(row_to_purchase).transpose()
    }

    async fn has_completed_purchase(
        &self,
        customer_id: &UserId,
        content_id: &ContentId,
    ) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM purchases
                WHERE customer_id = $1 AND content_id = $2 AND status = $3
            )
            "#,
        )
        .bind(customer_id.as_str())
        .bind(content_id.as_uuid())
        .bind(PurchaseStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check purchase: {}", e)))?;

        Ok(exists)
    }

    async fn list_by_customer(
        &self,
        customer_id: &UserId,
        options: &ListOptions,
    ) -> Result<PurchaseList, DomainError> {
        let sql = format!(
            "SELECT {} FROM purchases {} ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5",
            PURCHASE_COLUMNS, CUSTOMER_FILTER
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id.as_str())
            .bind(options.status.map(|s| s.as_str()))
            .bind(options.content_id.map(|c| *c.as_uuid()))
            .bind(i64::from(options.limit))
            .bind(i64::from(options.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list purchases: {}", e)))?;

        let items = rows
            .into_iter()
            .map(row_to_purchase)
            .collect::<Result<Vec<_>, _>>()?;
        let total = self.count_by_customer(customer_id, options).await?;

        Ok(PurchaseList { items, total })
    }
}
