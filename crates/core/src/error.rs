use chrono::NaiveDateTime;
use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// The first four variants form the runtime taxonomy of a monitoring session;
/// none of them stops acquisition. `Config` and `Render` are startup failures.
#[derive(Debug, Error)]
pub enum TemHumiError {
    /// Bad, unparsable or non-finite read. The cycle is skipped.
    #[error("transient sensor error: {0}")]
    TransientSensor(String),

    /// Out-of-order timestamp offered to a rolling series.
    #[error("stale sample at {timestamp} (latest retained is {latest})")]
    StaleSample {
        timestamp: NaiveDateTime,
        latest:    NaiveDateTime,
    },

    /// A log line that could not be turned into a sample.
    #[error("malformed log record at line {line}: {reason}")]
    MalformedLogRecord { line: u64, reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("serial error: {0}")]
    Serial(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("render error: {0}")]
    Render(String),
}

impl TemHumiError {
    /// `true` for conditions a running session reports and then rides out.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Render(_))
    }
}

pub type Result<T, E = TemHumiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_errors_are_recoverable() {
        assert!(TemHumiError::TransientSensor("nan".into()).is_recoverable());
        assert!(TemHumiError::MalformedLogRecord { line: 3, reason: "x".into() }.is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(TemHumiError::from(io).is_recoverable());
    }

    #[test]
    fn startup_errors_are_not_recoverable() {
        assert!(!TemHumiError::Config("bad".into()).is_recoverable());
        assert!(!TemHumiError::Render("no surface".into()).is_recoverable());
    }
}
