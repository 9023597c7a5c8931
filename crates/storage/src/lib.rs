//! Durable CSV log of accepted samples.
//!
//! ```text
//! # Temperature and Humidity Data Log
//! # Format: Timestamp,Humidity(%),Temperature(°C)
//! # Started: 2025-06-01 08:00:00
//! Timestamp,Humidity,Temperature
//! 2025-06-01 08:00:03,51.0,23.5
//! ```

pub mod loader;
pub mod logger;

pub use loader::{load_log, read_log, HistoricalLog};
pub use logger::Logger;

/// Timestamp column format, local wall-clock time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names of the header row.
pub const HEADER: [&str; 3] = ["Timestamp", "Humidity", "Temperature"];
