//! Revenue split configuration

use serde::Deserialize;

use crate::domain::purchase::FeeSchedule;

use super::error::ValidationError;

/// Default fee percentages in basis points (1 bp = 0.01%)
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    #[serde(default = "default_platform_fee")]
    pub platform_fee_basis_points: i64,

    #[serde(default)]
    pub organization_fee_basis_points: i64,
}

impl FeesConfig {
    pub fn schedule(&self) -> Result<FeeSchedule, ValidationError> {
        FeeSchedule::try_new(
            self.platform_fee_basis_points,
            self.organization_fee_basis_points,
        )
        .map_err(|e| ValidationError::InvalidFees(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schedule().map(|_| ())
    }
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            platform_fee_basis_points: default_platform_fee(),
            organization_fee_basis_points: 0,
        }
    }
}

fn default_platform_fee() -> i64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fee_schedule_default() {
        let schedule = FeesConfig::default().schedule().unwrap();
        assert_eq!(schedule, FeeSchedule::default());
    }

    #[test]
    fn test_out_of_range_fee_is_invalid() {
        let config = FeesConfig {
            platform_fee_basis_points: 10_001,
            organization_fee_basis_points: 0,
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFees(_))));
    }

    #[test]
    fn test_negative_fee_is_invalid() {
        let config = FeesConfig {
            platform_fee_basis_points: 1000,
            organization_fee_basis_points: -1,
        };
        assert!(config.validate().is_err());
    }
}
