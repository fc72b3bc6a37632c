//! Statistics for training telemetry.
//!
//! Per-generation fitness distributions for generation reports, and the
//! progress measure the adaptive mutation controller uses for plateau
//! detection.

pub mod fitness;

pub use fitness::{FitnessSummary, improvement};
