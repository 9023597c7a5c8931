//! In-memory data handling for the monitor.
//!
//! - [`RollingSeries`]: bounded-duration live window fed by acquisition
//! - [`smooth`]: display-only spline densification
//! - [`markers`] / [`milestones`]: labels derived from a series at render time
//! - [`aggregate_buckets`]: coarse averaging for long historical plots
//! - [`SeriesStats`]: min / max / average summary

pub mod bucket;
pub mod marker;
pub mod rolling;
pub mod smoother;
pub mod stats;

pub use bucket::aggregate_buckets;
pub use marker::{markers, milestones, Marker, MarkerLabel, Milestone};
pub use rolling::RollingSeries;
pub use smoother::{smooth, SmoothPoint, DENSITY};
pub use stats::{AxisStats, SeriesStats};
