//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `content` - Read-only catalog snapshot and purchasability rules
//! - `purchase` - Purchases, access grants, revenue splits
//! - `payment` - Gateway webhook verification and typed events

pub mod content;
pub mod foundation;
pub mod payment;
pub mod purchase;
