//! Row mapping shared by the purchase repository and reader.

use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::foundation::{
    ContentId, DomainError, OrganizationId, PurchaseId, Timestamp, UserId,
};
use crate::domain::purchase::{Currency, PaymentReference, Purchase, PurchaseStatus};

pub(super) const PURCHASE_COLUMNS: &str = r#"
    id, payment_reference, customer_id, content_id, organization_id,
    amount_paid_cents, currency, platform_fee_cents, organization_fee_cents,
    creator_payout_cents, status, purchased_at, created_at, updated_at
"#;

fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid {} in purchases row: {}", column, err))
}

pub(super) fn row_to_purchase(row: PgRow) -> Result<Purchase, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::database(format!("Failed to read purchase row: {}", e));

    let id: Uuid = row.try_get("id").map_err(get_err)?;
    let payment_reference: String = row.try_get("payment_reference").map_err(get_err)?;
    let customer_id: String = row.try_get("customer_id").map_err(get_err)?;
    let content_id: Uuid = row.try_get("content_id").map_err(get_err)?;
    let organization_id: Uuid = row.try_get("organization_id").map_err(get_err)?;
    let currency: String = row.try_get("currency").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;
    let purchased_at: Option<chrono::DateTime<chrono::Utc>> =
        row.try_get("purchased_at").map_err(get_err)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(get_err)?;
    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at").map_err(get_err)?;

    Ok(Purchase {
        id: PurchaseId::from_uuid(id),
        payment_reference: PaymentReference::new(payment_reference)
            .map_err(|e| corrupt("payment_reference", e))?,
        customer_id: UserId::new(customer_id).map_err(|e| corrupt("customer_id", e))?,
        content_id: ContentId::from_uuid(content_id),
        organization_id: OrganizationId::from_uuid(organization_id),
        amount_paid_cents: row.try_get("amount_paid_cents").map_err(get_err)?,
        currency: Currency::new(currency).map_err(|e| corrupt("currency", e))?,
        platform_fee_cents: row.try_get("platform_fee_cents").map_err(get_err)?,
        organization_fee_cents: row.try_get("organization_fee_cents").map_err(get_err)?,
        creator_payout_cents: row.try_get("creator_payout_cents").map_err(get_err)?,
        status: PurchaseStatus::parse(&status).map_err(|e| corrupt("status", e))?,
        purchased_at: purchased_at.map(Timestamp::from_datetime),
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
