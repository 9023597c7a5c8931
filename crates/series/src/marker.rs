//! Labels derived from a series on every render. Nothing here is persisted.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::HashSet;
use temhumi_core::{Sample, Series, SeriesKind};

/// Label offset from the curve, as a fraction of the axis span.
pub const LABEL_OFFSET: f64 = 0.08;
/// Minimum distance kept between a label and the axis edge, same unit.
pub const EDGE_MARGIN: f64 = 0.04;
/// Hours that get a milestone label (every sixth hour of the day).
pub const MILESTONE_EVERY_HOURS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerLabel {
    /// Oldest sample still in the window.
    Start,
    /// Newest sample.
    Now,
}

impl MarkerLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Now   => "NOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub label:     MarkerLabel,
    pub kind:      SeriesKind,
    pub value:     f64,
    pub timestamp: NaiveDateTime,
}

impl Marker {
    /// `"START: 51.0%"`, `"NOW: 23.5°C"`.
    pub fn text(&self) -> String {
        format!("{}: {:.1}{}", self.label.as_str(), self.value, self.kind.unit())
    }

    /// Where the label sits on the value axis: START below the curve, NOW
    /// above it, both kept inside the axis range.
    pub fn label_value(&self) -> f64 {
        let direction = match self.label {
            MarkerLabel::Start => -1.0,
            MarkerLabel::Now   => 1.0,
        };
        place_label(self.kind, self.value, direction)
    }
}

/// START and NOW markers for both axes, or nothing for an empty series.
///
/// START follows the window: once eviction has started it names the oldest
/// visible sample, not the first sample of the session.
pub fn markers(series: &Series) -> Vec<Marker> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(4);
    for kind in SeriesKind::ALL {
        out.push(Marker {
            label:     MarkerLabel::Start,
            kind,
            value:     first.value(kind),
            timestamp: first.timestamp,
        });
        out.push(Marker {
            label:     MarkerLabel::Now,
            kind,
            value:     last.value(kind),
            timestamp: last.timestamp,
        });
    }
    out
}

/// First sample falling in each 00/06/12/18 o'clock hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestone {
    pub sample: Sample,
}

impl Milestone {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.sample.timestamp
    }

    /// Two lines: `"06:00"` then the value, e.g. `"51.0%"`.
    pub fn text(&self, kind: SeriesKind) -> String {
        format!(
            "{}\n{:.1}{}",
            self.sample.timestamp.format("%H:%M"),
            self.sample.value(kind),
            kind.unit()
        )
    }

    /// Milestone labels sit above the curve.
    pub fn label_value(&self, kind: SeriesKind) -> f64 {
        place_label(kind, self.sample.value(kind), 1.0)
    }
}

pub fn milestones(series: &Series) -> Vec<Milestone> {
    let mut seen: HashSet<(NaiveDate, u32)> = HashSet::new();
    series
        .iter()
        .filter(|s| s.timestamp.hour() % MILESTONE_EVERY_HOURS == 0)
        .filter(|s| seen.insert((s.timestamp.date(), s.timestamp.hour())))
        .map(|s| Milestone { sample: *s })
        .collect()
}

fn place_label(kind: SeriesKind, value: f64, direction: f64) -> f64 {
    let range  = kind.axis_range();
    let offset = range.span() * LABEL_OFFSET;
    let margin = range.span() * EDGE_MARGIN;
    (value + direction * offset).clamp(range.min + margin, range.max - margin)
}
