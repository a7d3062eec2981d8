//! Fee schedule backed by static configuration.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, OrganizationId};
use crate::domain::purchase::FeeSchedule;
use crate::ports::FeeScheduleSource;

/// Returns the configured default for every organization unless an
/// override has been registered for it.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredFeeSchedule {
    default: FeeSchedule,
    overrides: HashMap<OrganizationId, FeeSchedule>,
}

impl ConfiguredFeeSchedule {
    pub fn new(default: FeeSchedule) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, organization_id: OrganizationId, schedule: FeeSchedule) -> Self {
        self.overrides.insert(organization_id, schedule);
        self
    }

    pub fn default_schedule(&self) -> FeeSchedule {
        self.default
    }
}

#[async_trait]
impl FeeScheduleSource for ConfiguredFeeSchedule {
    async fn resolve(&self, organization_id: &OrganizationId) -> Result<FeeSchedule, DomainError> {
        Ok(self
            .overrides
            .get(organization_id)
            .copied()
            .unwrap_or(self.default))
    }
}
