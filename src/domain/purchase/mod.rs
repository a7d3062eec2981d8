//! Purchase domain: settled purchases, access grants, revenue splits.

mod access_grant;
mod aggregate;
mod errors;
mod redirect;
pub mod revenue;

pub use access_grant::{AccessType, ContentAccessGrant};
pub use aggregate::{Currency, NewPurchase, PaymentReference, Purchase, PurchaseStatus};
pub use errors::PurchaseError;
pub use redirect::RedirectAllowList;
pub use revenue::{calculate, BasisPoints, FeeSchedule, RevenueSplit, RevenueSplitError};
