//! Creator Commerce - Purchase and revenue distribution for paid content
//!
//! Customers buy one-time access to creator content through a hosted
//! checkout. Signed gateway webhooks complete the purchase exactly once,
//! split the revenue between platform, organization and creator, and grant
//! lasting access.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
