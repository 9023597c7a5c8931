use crate::{HEADER, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use temhumi_core::{Result, Sample, Series, TemHumiError};
use tracing::{info, warn};

/// Everything recovered from a log file.
#[derive(Debug, Clone, Default)]
pub struct HistoricalLog {
    /// Valid records in file order. No window is applied.
    pub series:  Series,
    /// Records that could not be parsed.
    pub skipped: usize,
}

/// Load the whole log at `path`.
///
/// Only failing to open the file is an error; bad lines are skipped and
/// counted.
pub fn load_log(path: impl AsRef<Path>) -> Result<HistoricalLog> {
    let path = path.as_ref();
    info!("Reading data from {}...", path.display());
    let file = File::open(path)?;
    Ok(read_log(file))
}

/// Parse a log from any reader. `#` comment lines are ignored.
pub fn read_log<R: Read>(reader: R) -> HistoricalLog {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = match rdr.headers() {
        Ok(headers) => Columns::locate(headers),
        Err(e) => {
            warn!("Unreadable log header ({e}); assuming {}", HEADER.join(","));
            Columns::default()
        }
    };

    let mut log = HistoricalLog::default();
    for record in rdr.records() {
        let parsed = record
            .map_err(|e| TemHumiError::MalformedLogRecord {
                line:   e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })
            .and_then(|r| columns.parse(&r));

        match parsed {
            Ok(sample) => log.series.push(sample),
            Err(e) => {
                warn!("Skipping invalid row: {e}");
                log.skipped += 1;
            }
        }
    }

    log
}

/// Field positions of the three columns.
#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp:   usize,
    humidity:    usize,
    temperature: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            timestamp:   0,
            humidity:    1,
            temperature: 2,
        }
    }
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        match (find(HEADER[0]), find(HEADER[1]), find(HEADER[2])) {
            (Some(timestamp), Some(humidity), Some(temperature)) => Self {
                timestamp,
                humidity,
                temperature,
            },
            _ => {
                warn!(
                    "Log header {:?} lacks the expected columns; reading positionally",
                    headers.iter().collect::<Vec<_>>()
                );
                Self::default()
            }
        }
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Sample> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |reason: String| TemHumiError::MalformedLogRecord { line, reason };

        let field = |index: usize, name: &str| {
            record
                .get(index)
                .filter(|f| !f.is_empty())
                .ok_or_else(|| malformed(format!("missing {name}")))
        };

        let raw_ts = field(self.timestamp, "timestamp")?;
        let timestamp = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
            .map_err(|e| malformed(format!("timestamp {raw_ts:?}: {e}")))?;

        let number = |index: usize, name: &str| -> Result<f64> {
            let raw = field(index, name)?;
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(malformed(format!("{name} {raw:?} is not a number"))),
            }
        };

        Ok(Sample::new(
            timestamp,
            number(self.humidity, "humidity")?,
            number(self.temperature, "temperature")?,
        ))
    }
}
