//! Content catalog view.
//!
//! The catalog itself is owned elsewhere; this module only models the
//! fields the purchase pipeline reads and the purchasability rules.

mod snapshot;

pub use snapshot::{Content, ContentStatus, NotPurchasableReason, PurchasableContent};

#[cfg(test)]
pub(crate) use snapshot::published_content;
