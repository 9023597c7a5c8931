use chrono::NaiveDateTime;
use temhumi_config::CalibrationConfig;
use temhumi_core::{Result, Sample, TemHumiError};

/// Uncalibrated values exactly as the board reported them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub humidity:    f64,
    pub temperature: f64,
}

/// Parse one protocol line into a [`RawReading`].
///
/// The board prints `humidity|temperature`; `humidity,temperature` is also
/// accepted. Extra fields after the second are ignored. Anything else,
/// including `nan` and infinities, is a transient sensor error.
pub fn parse_reading(line: &str) -> Result<RawReading> {
    let line = line.trim();
    let separator = if line.contains('|') {
        '|'
    } else if line.contains(',') {
        ','
    } else {
        return Err(TemHumiError::TransientSensor(format!(
            "no separator in {line:?}"
        )));
    };

    let mut parts = line.split(separator).map(str::trim);
    let (Some(h), Some(t)) = (parts.next(), parts.next()) else {
        return Err(TemHumiError::TransientSensor(format!("expected two fields in {line:?}")));
    };

    Ok(RawReading {
        humidity:    parse_value("humidity", h)?,
        temperature: parse_value("temperature", t)?,
    })
}

fn parse_value(what: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| TemHumiError::TransientSensor(format!("{what} {raw:?} is not a number")))?;
    if !value.is_finite() {
        return Err(TemHumiError::TransientSensor(format!("{what} reading is {raw}")));
    }
    Ok(value)
}

/// Offsets added to raw readings before they become samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibration {
    pub humidity_offset:    f64,
    pub temperature_offset: f64,
}

impl Calibration {
    pub fn from_config(cfg: &CalibrationConfig) -> Self {
        Self {
            humidity_offset:    cfg.humidity_offset,
            temperature_offset: cfg.temperature_offset,
        }
    }

    /// Offset-adjust `raw`, round to one decimal, and stamp it.
    pub fn apply(&self, raw: RawReading, timestamp: NaiveDateTime) -> Sample {
        Sample::new(
            timestamp,
            round_tenth(raw.humidity + self.humidity_offset),
            round_tenth(raw.temperature + self.temperature_offset),
        )
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
