//! Fee schedule source port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrganizationId};
use crate::domain::purchase::FeeSchedule;

/// Resolves the fee percentages that apply to an organization's sales.
///
/// Called once per completion; the result is passed explicitly to the
/// split calculator.
#[async_trait]
pub trait FeeScheduleSource: Send + Sync {
    async fn resolve(&self, organization_id: &OrganizationId) -> Result<FeeSchedule, DomainError>;
}
