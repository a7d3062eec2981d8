//! Revenue split calculation.
//!
//! Splits a charge into platform fee, organization fee and creator payout.
//! Platform and organization fees round up so they never under-collect;
//! the creator absorbs the rounding remainder.
//!
//! ```text
//! platform  = ceil(amount * platform_bp / 10000)
//! remaining = amount - platform
//! org       = ceil(remaining * org_bp / 10000)
//! creator   = amount - platform - org
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 10000 basis points = 100%.
pub const BASIS_POINTS_SCALE: i64 = 10_000;

/// Default platform fee (10%).
pub const DEFAULT_PLATFORM_FEE_BASIS_POINTS: u16 = 1_000;

/// Default organization fee (0%).
pub const DEFAULT_ORGANIZATION_FEE_BASIS_POINTS: u16 = 0;

/// Errors raised by the split calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevenueSplitError {
    /// The charge amount is negative.
    #[error("amount must be a non-negative number of cents, got {0}")]
    InvalidAmount(i64),

    /// A fee percentage is outside [0, 10000] basis points.
    #[error("{field} must be between 0 and 10000 basis points, got {value}")]
    InvalidBasisPoints { field: &'static str, value: i64 },

    /// The computed parts do not add back up to the amount.
    ///
    /// This is a calculator defect, never a caller error.
    #[error("revenue split invariant violated: {platform} + {organization} + {creator} != {amount}")]
    InvariantViolated {
        amount: i64,
        platform: i64,
        organization: i64,
        creator: i64,
    },
}

impl RevenueSplitError {
    /// True when the error signals a defect rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, RevenueSplitError::InvariantViolated { .. })
    }
}

/// A fee percentage expressed in basis points, in [0, 10000].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BasisPoints(u16);

impl BasisPoints {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED_PERCENT: Self = Self(10_000);

    /// Creates a BasisPoints value, rejecting anything outside [0, 10000].
    pub fn try_new(value: i64) -> Result<Self, RevenueSplitError> {
        Self::checked("basis_points", value)
    }

    fn checked(field: &'static str, value: i64) -> Result<Self, RevenueSplitError> {
        if !(0..=BASIS_POINTS_SCALE).contains(&value) {
            return Err(RevenueSplitError::InvalidBasisPoints { field, value });
        }
        Ok(Self(value as u16))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for BasisPoints {
    type Error = RevenueSplitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<BasisPoints> for i64 {
    fn from(bp: BasisPoints) -> Self {
        i64::from(bp.0)
    }
}

/// Fee percentages applied to a single purchase.
///
/// Resolved once per request and passed explicitly into the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub platform_fee: BasisPoints,
    pub organization_fee: BasisPoints,
}

impl FeeSchedule {
    /// Builds a schedule from raw basis-point values.
    pub fn try_new(platform_bp: i64, organization_bp: i64) -> Result<Self, RevenueSplitError> {
        Ok(Self {
            platform_fee: BasisPoints::checked("platform_fee_basis_points", platform_bp)?,
            organization_fee: BasisPoints::checked("organization_fee_basis_points", organization_bp)?,
        })
    }

    /// Splits `amount_cents` according to this schedule.
    pub fn split(&self, amount_cents: i64) -> Result<RevenueSplit, RevenueSplitError> {
        calculate(
            amount_cents,
            i64::from(self.platform_fee),
            i64::from(self.organization_fee),
        )
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            platform_fee: BasisPoints(DEFAULT_PLATFORM_FEE_BASIS_POINTS),
            organization_fee: BasisPoints(DEFAULT_ORGANIZATION_FEE_BASIS_POINTS),
        }
    }
}

/// Three-way division of a charge. Always sums to the charged amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSplit {
    pub platform_fee_cents: i64,
    pub organization_fee_cents: i64,
    pub creator_payout_cents: i64,
}

impl RevenueSplit {
    pub fn total(&self) -> i64 {
        self.platform_fee_cents + self.organization_fee_cents + self.creator_payout_cents
    }

    /// Re-checks that the parts are non-negative and add up to `amount_cents`.
    pub fn verify(&self, amount_cents: i64) -> Result<(), RevenueSplitError> {
        let non_negative = self.platform_fee_cents >= 0
            && self.organization_fee_cents >= 0
            && self.creator_payout_cents >= 0;

        if !non_negative || self.total() != amount_cents {
            return Err(RevenueSplitError::InvariantViolated {
                amount: amount_cents,
                platform: self.platform_fee_cents,
                organization: self.organization_fee_cents,
                creator: self.creator_payout_cents,
            });
        }
        Ok(())
    }
}

/// Computes the revenue split for a charge.
///
/// # Errors
///
/// - `InvalidAmount` / `InvalidBasisPoints` for out-of-range input
/// - `InvariantViolated` if the post-condition check fails
pub fn calculate(
    amount_cents: i64,
    platform_bp: i64,
    organization_bp: i64,
) -> Result<RevenueSplit, RevenueSplitError> {
    if amount_cents < 0 {
        return Err(RevenueSplitError::InvalidAmount(amount_cents));
    }
    let platform_bp = BasisPoints::checked("platform_fee_basis_points", platform_bp)?;
    let organization_bp = BasisPoints::checked("organization_fee_basis_points", organization_bp)?;

    let platform = ceil_fraction(amount_cents, platform_bp);
    let remaining = amount_cents - platform;
    let organization = ceil_fraction(remaining, organization_bp);
    let creator = amount_cents - platform - organization;

    let split = RevenueSplit {
        platform_fee_cents: platform,
        organization_fee_cents: organization,
        creator_payout_cents: creator,
    };
    split.verify(amount_cents)?;
    Ok(split)
}

/// `ceil(amount * bp / 10000)` without overflow; the result never exceeds `amount`.
fn ceil_fraction(amount: i64, bp: BasisPoints) -> i64 {
    let numerator = i128::from(amount) * i128::from(bp.value());
    let scale = i128::from(BASIS_POINTS_SCALE);
    ((numerator + scale - 1) / scale) as i64
}
