//! Maintenance cycles: progress derivation, lifecycle, reporting

pub mod models;
pub mod tracker;

pub use models::{Cycle, CycleProgress, CycleStats};
pub use tracker::{compute_progress, CycleTracker};
