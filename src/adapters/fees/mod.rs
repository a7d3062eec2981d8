//! Fee schedule sources.

mod configured;

pub use configured::ConfiguredFeeSchedule;
