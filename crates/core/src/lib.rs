pub mod error;
pub mod event;
pub mod sample;

pub use error::{Result, TemHumiError};
pub use event::AcquisitionEvent;
pub use sample::{Sample, Series, SeriesKind, ValueRange};
