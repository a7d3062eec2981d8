//! PostgreSQL implementation of PurchaseRepository.
//!
//! The purchase insert and the access grant upsert share one transaction.
//! Duplicate payment references are detected by the
//! `purchases_payment_reference_key` unique constraint, never by a prior read.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::purchase::{ContentAccessGrant, PaymentReference, Purchase};
use crate::ports::{InsertOutcome, PurchaseRepository};

use super::purchase_rows::{row_to_purchase, PURCHASE_COLUMNS};

const PAYMENT_REFERENCE_CONSTRAINT: &str = "purchases_payment_reference_key";

/// PostgreSQL implementation of PurchaseRepository.
#[derive(Clone)]
pub struct PostgresPurchaseRepository {
    pool: PgPool,
}

impl PostgresPurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRepository for PostgresPurchaseRepository {
    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Purchase>, DomainError> {
        let sql = format!(
            "SELECT {} FROM purchases WHERE payment_reference = $1",
            PURCHASE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(reference.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch purchase: {}", e)))?;

        row.map(row_to_purchase).transpose()
    }

    async fn insert_with_access_grant(
        &self,
        purchase: &Purchase,
        grant: &ContentAccessGrant,
    ) -> Result<InsertOutcome, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::database(format!("Failed to begin transaction: {}", e))
        })?;

        if !insert_purchase(&mut tx, purchase).await? {
            // Dropping the transaction rolls it back; nothing was written.
            return Ok(InsertOutcome::Conflicted {
                payment_reference: purchase.payment_reference.clone(),
            });
        }

        upsert_access_grant(&mut tx, grant).await?;

        tx.commit().await.map_err(|e| {
            DomainError::database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(InsertOutcome::Inserted(purchase.clone()))
    }
}

/// Returns false when the payment reference already exists.
async fn insert_purchase(
    tx: &mut Transaction<'_, Postgres>,
    purchase: &Purchase,
) -> Result<bool, DomainError> {
    let result = sqlx::query(
        r#"
        INSERT INTO purchases (
            id, payment_reference, customer_id, content_id, organization_id,
            amount_paid_cents, currency, platform_fee_cents, organization_fee_cents,
            creator_payout_cents, status, purchased_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT ON CONSTRAINT purchases_payment_reference_key DO NOTHING
        "#,
    )
    .bind(purchase.id.as_uuid())
    .bind(purchase.payment_reference.as_str())
    .bind(purchase.customer_id.as_str())
    .bind(purchase.content_id.as_uuid())
    .bind(purchase.organization_id.as_uuid())
    .bind(purchase.amount_paid_cents)
    .bind(purchase.currency.as_str())
    .bind(purchase.platform_fee_cents)
    .bind(purchase.organization_fee_cents)
    .bind(purchase.creator_payout_cents)
    .bind(purchase.status.as_str())
    .bind(purchase.purchased_at.map(|t| *t.as_datetime()))
    .bind(purchase.created_at.as_datetime())
    .bind(purchase.updated_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.constraint() == Some(PAYMENT_REFERENCE_CONSTRAINT) {
                return DomainError::new(
                    ErrorCode::UniqueViolation,
                    "Payment reference already recorded",
                );
            }
        }
        DomainError::database(format!("Failed to insert purchase: {}", e))
    })?;

    Ok(result.rows_affected() == 1)
}

async fn upsert_access_grant(
    tx: &mut Transaction<'_, Postgres>,
    grant: &ContentAccessGrant,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO content_access (
            customer_id, content_id, access_type, expires_at, granted_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $5)
        ON CONFLICT (customer_id, content_id) DO UPDATE SET
            access_type = EXCLUDED.access_type,
            expires_at = EXCLUDED.expires_at,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(grant.customer_id.as_str())
    .bind(grant.content_id.as_uuid())
    .bind(grant.access_type.as_str())
    .bind(grant.expires_at.map(|t| *t.as_datetime()))
    .bind(grant.granted_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| DomainError::database(format!("Failed to upsert access grant: {}", e)))?;

    Ok(())
}
