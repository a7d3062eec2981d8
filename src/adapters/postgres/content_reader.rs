//! PostgreSQL implementation of ContentReader.
//!
//! Read-only view of the catalog's `content` table.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::content::{Content, ContentStatus};
use crate::domain::foundation::{ContentId, DomainError, OrganizationId, Timestamp, UserId};
use crate::ports::ContentReader;

#[derive(Clone)]
pub struct PostgresContentReader {
    pool: PgPool,
}

impl PostgresContentReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentReader for PostgresContentReader {
    async fn find_by_id(&self, id: &ContentId) -> Result<Option<Content>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, status, price_cents, organization_id, creator_id, deleted_at
            FROM content WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch content: {}", e)))?;

        row.map(row_to_content).transpose()
    }
}

fn row_to_content(row: PgRow) -> Result<Content, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::database(format!("Failed to read content row: {}", e));

    let id: Uuid = row.try_get("id").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;
    let organization_id: Option<Uuid> = row.try_get("organization_id").map_err(get_err)?;
    let creator_id: String = row.try_get("creator_id").map_err(get_err)?;
    let deleted_at: Option<chrono::DateTime<chrono::Utc>> =
        row.try_get("deleted_at").map_err(get_err)?;

    Ok(Content {
        id: ContentId::from_uuid(id),
        title: row.try_get("title").map_err(get_err)?,
        status: ContentStatus::parse(&status).ok_or_else(|| {
            DomainError::database(format!("Invalid content status: {}", status))
        })?,
        price_cents: row.try_get("price_cents").map_err(get_err)?,
        organization_id: organization_id.map(OrganizationId::from_uuid),
        creator_id: UserId::new(creator_id)
            .map_err(|e| DomainError::database(format!("Invalid creator_id: {}", e)))?,
        deleted_at: deleted_at.map(Timestamp::from_datetime),
    })
}
