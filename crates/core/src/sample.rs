use chrono::NaiveDateTime;

/// One calibrated observation.
///
/// Timestamps are local wall-clock time, the same representation the log
/// file uses. Values are already offset-adjusted; raw sensor output never
/// reaches this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp:   NaiveDateTime,
    /// Relative humidity in percent.
    pub humidity:    f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, humidity: f64, temperature: f64) -> Self {
        Self {
            timestamp,
            humidity,
            temperature,
        }
    }

    /// Value on the axis selected by `kind`.
    #[inline]
    pub fn value(&self, kind: SeriesKind) -> f64 {
        match kind {
            SeriesKind::Humidity    => self.humidity,
            SeriesKind::Temperature => self.temperature,
        }
    }
}

/// Time-ordered samples; insertion order equals time order.
///
/// A `Series` is always an owned value. The rolling window hands out copies
/// of its buffer as `Series`, and the historical loader builds one directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap samples that are already in time order.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// `(earliest, latest)` timestamps, or `None` for an empty series.
    ///
    /// Scans every sample: a series loaded from a log keeps file order,
    /// which can step backwards when the clock was changed.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut stamps = self.samples.iter().map(|s| s.timestamp);
        let first = stamps.next()?;
        Some(stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Which of the two measured quantities a curve, marker or axis refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Humidity,
    Temperature,
}

impl SeriesKind {
    pub const ALL: [Self; 2] = [Self::Humidity, Self::Temperature];

    /// Fixed plot range for this quantity.
    pub fn axis_range(self) -> ValueRange {
        match self {
            Self::Humidity    => ValueRange::new(20.0, 100.0),
            Self::Temperature => ValueRange::new(10.0, 40.0),
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Humidity    => "%",
            Self::Temperature => "°C",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Humidity    => "Humidity",
            Self::Temperature => "Temperature",
        }
    }
}

/// Closed value interval `[min, max]` of a plot axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}
