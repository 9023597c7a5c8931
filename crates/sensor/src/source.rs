use crate::reading::{parse_reading, Calibration};
use chrono::{Local, NaiveDateTime};
use std::io::{BufRead, ErrorKind};
use temhumi_core::{Result, Sample, TemHumiError};

/// Anything that can hand back calibrated samples one at a time.
///
/// Implementations block for at most their own poll timeout.
pub trait SampleSource: Send {
    /// - `Ok(Some(_))`: a calibrated sample
    /// - `Ok(None)`: nothing arrived this poll
    /// - `Err(TransientSensor)`: a bad read; try again
    /// - any other error: the source is gone and must be reopened
    fn next_sample(&mut self) -> Result<Option<Sample>>;

    /// Name used in log messages.
    fn name(&self) -> &str;
}

/// Current local wall-clock time, the timestamp domain of every sample.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Line-protocol source over any buffered reader.
///
/// Partial lines left behind by a read timeout are kept and completed on the
/// next poll.
pub struct LineSource<R> {
    reader:      R,
    name:        String,
    calibration: Calibration,
    clock:       fn() -> NaiveDateTime,
    pending:     String,
}

impl<R: BufRead + Send> LineSource<R> {
    pub fn new(reader: R, name: impl Into<String>, calibration: Calibration) -> Self {
        Self {
            reader,
            name: name.into(),
            calibration,
            clock: local_now,
            pending: String::new(),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }
}

impl<R: BufRead + Send> SampleSource for LineSource<R> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        match self.reader.read_line(&mut self.pending) {
            Ok(0) if self.pending.is_empty() => {
                return Err(TemHumiError::Io {
                    source: std::io::Error::new(ErrorKind::UnexpectedEof, "sensor stream closed"),
                });
            }
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                self.pending.clear();
                return Err(TemHumiError::TransientSensor("non UTF-8 data on the line".into()));
            }
            Err(e) => return Err(e.into()),
        }

        let line = std::mem::take(&mut self.pending);
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        tracing::debug!("{} | RAW: {line}", self.name);
        let raw = parse_reading(line)?;
        Ok(Some(self.calibration.apply(raw, (self.clock)())))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
