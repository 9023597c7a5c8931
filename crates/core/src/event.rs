use crate::sample::Series;

/// Everything the acquisition task reports to whoever renders.
///
/// Sources:
/// - Serial reader thread → `Connected`, `Disconnected`, `SensorFault`
/// - Rolling series       → `Snapshot` (after every append or eviction),
///   `SampleRejected` (reading older than the newest accepted one)
/// - Logger               → `LogWriteFailed`
#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    /// Owned copy of the current window. Never aliases the live buffer.
    Snapshot(Series),
    /// Serial session opened (carries the port name).
    Connected(String),
    /// Serial session lost; the reader retries on its own.
    Disconnected(String),
    /// A read was skipped; the previous window is kept as-is.
    SensorFault(String),
    /// Out-of-order reading dropped; the window is unchanged.
    SampleRejected(String),
    /// Sample kept in memory but not persisted this cycle.
    LogWriteFailed(String),
}
