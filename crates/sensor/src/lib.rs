pub mod reading;
pub mod serial;
pub mod source;

pub use reading::{parse_reading, Calibration, RawReading};
pub use serial::{open_serial, SerialSource};
pub use source::{local_now, LineSource, SampleSource};
