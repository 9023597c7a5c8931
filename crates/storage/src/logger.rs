use crate::{HEADER, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use temhumi_core::{Result, Sample};
use tracing::info;

/// Append-only writer for the sample log.
///
/// Every [`append`](Self::append) is flushed before it returns, so a sample
/// is on disk before the next acquisition cycle starts.
pub struct Logger<W: Write = File> {
    out: csv::Writer<W>,
}

impl Logger<File> {
    /// Open `path` for appending, creating it with the comment preamble and
    /// header row when it is missing or empty.
    pub fn open(path: impl AsRef<Path>, started: NaiveDateTime) -> Result<Self> {
        let path = path.as_ref();
        let fresh = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if fresh {
            info!("Created new log file: {}", path.display());
            Self::with_preamble(file, started)
        } else {
            info!("Appending to existing log file: {}", path.display());
            Ok(Self::new(file))
        }
    }
}

impl<W: Write> Logger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(writer),
        }
    }

    /// Start a new log: comment lines, then the header row.
    pub fn with_preamble(mut writer: W, started: NaiveDateTime) -> Result<Self> {
        writeln!(writer, "# Temperature and Humidity Data Log")?;
        writeln!(writer, "# Format: Timestamp,Humidity(%),Temperature(°C)")?;
        writeln!(writer, "# Started: {}", started.format(TIMESTAMP_FORMAT))?;

        let mut logger = Self::new(writer);
        logger.out.write_record(HEADER).map_err(std::io::Error::from)?;
        logger.out.flush()?;
        Ok(logger)
    }

    /// Write one row: timestamp, humidity and temperature to one decimal.
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        self.out
            .write_record([
                sample.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.1}", sample.humidity),
                format!("{:.1}", sample.temperature),
            ])
            .map_err(std::io::Error::from)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }
}
