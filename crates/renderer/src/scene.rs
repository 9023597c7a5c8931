//! Backend-neutral description of one frame.
//!
//! The x axis is seconds since [`PlotScene::origin`], so every backend maps
//! the same plain `f64` ranges. Values stay in their own units; each
//! [`Panel`] carries the fixed axis range it is drawn against.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use temhumi_core::{Series, SeriesKind, ValueRange};
use temhumi_series::{markers, milestones, smooth, MarkerLabel, SeriesStats};

pub const LIVE_TITLE:       &str = "Real-Time Temperature and Humidity";
pub const HISTORICAL_TITLE: &str = "Temperature and Humidity Data from Log File";

/// Spacing of the labelled time ticks.
pub const MAJOR_TICK_HOURS: i64 = 6;
/// Upper bound on labelled ticks per axis; longer spans widen the stride.
pub const MAX_TICKS: usize = 28;
/// Shortest x span drawn, so a single point still gets an axis.
const MIN_SPAN_SECS: f64 = 60.0;

/// Role of a text label, which decides its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Start,
    Now,
    Milestone,
}

/// Text pinned to a point of the curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub role:   LabelRole,
    /// One entry per line.
    pub lines:  Vec<String>,
    /// The sample it annotates, `(x, value)`.
    pub anchor: (f64, f64),
    /// Value-axis position of the text, already inside the axis range.
    pub y:      f64,
}

/// Position on the x axis with its text.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x:    f64,
    pub text: String,
}

/// One quantity: a curve, optional raw points and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub kind:   SeriesKind,
    pub range:  ValueRange,
    pub curve:  Vec<(f64, f64)>,
    pub points: Vec<(f64, f64)>,
    pub labels: Vec<Label>,
    pub legend: String,
}

impl Panel {
    fn new(kind: SeriesKind, legend: String) -> Self {
        Self {
            kind,
            range: kind.axis_range(),
            curve: Vec::new(),
            points: Vec::new(),
            labels: Vec::new(),
            legend,
        }
    }

    /// `"Humidity (%)"`.
    pub fn axis_title(&self) -> String {
        format!("{} ({})", self.kind.name(), self.kind.unit())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotScene {
    pub title:      &'static str,
    /// Left edge of the x axis.
    pub origin:     NaiveDateTime,
    /// Width of the x axis in seconds.
    pub span:       f64,
    /// Humidity on top, temperature below.
    pub panels:     [Panel; 2],
    /// `HH:MM` ticks on six-hour boundaries.
    pub hour_ticks: Vec<Tick>,
    /// One `Mon 02 Jun` label per midnight.
    pub day_ticks:  Vec<Tick>,
    /// Summary lines; empty for the live view.
    pub stats:      Vec<String>,
}

impl PlotScene {
    /// Live view: the axis spans `[now - window, now]` so the curve scrolls
    /// left as time passes, with START/NOW markers and six-hour milestones.
    pub fn live(series: &Series, now: NaiveDateTime, window: TimeDelta) -> Self {
        let origin = now - window;
        let span   = (window.num_milliseconds() as f64 / 1000.0).max(MIN_SPAN_SECS);

        let mut scene = Self::frame(LIVE_TITLE, origin, span, |kind| {
            format!("{} ({})", kind.name(), kind.unit())
        });
        scene.fill_curves(series);

        for marker in markers(series) {
            let x = scene.x_of(marker.timestamp);
            let role = match marker.label {
                MarkerLabel::Start => LabelRole::Start,
                MarkerLabel::Now   => LabelRole::Now,
            };
            scene.panel_mut(marker.kind).labels.push(Label {
                role,
                lines:  vec![marker.text()],
                anchor: (x, marker.value),
                y:      marker.label_value(),
            });
        }

        for milestone in milestones(series) {
            let x = scene.x_of(milestone.timestamp());
            for kind in SeriesKind::ALL {
                scene.panel_mut(kind).labels.push(Label {
                    role:   LabelRole::Milestone,
                    lines:  milestone.text(kind).lines().map(str::to_owned).collect(),
                    anchor: (x, milestone.sample.value(kind)),
                    y:      milestone.label_value(kind),
                });
            }
        }

        scene
    }

    /// Historical view over an already aggregated series: the axis spans
    /// the data, raw points are drawn under the curve, and legends and the
    /// stats box summarise the whole log.
    pub fn historical(series: &Series) -> Self {
        let stats = SeriesStats::compute(series);
        let (origin, span) = match series.bounds() {
            Some((start, end)) => (start, seconds(end.signed_duration_since(start)).max(MIN_SPAN_SECS)),
            None               => (NaiveDateTime::default(), MIN_SPAN_SECS),
        };

        let mut scene = Self::frame(HISTORICAL_TITLE, origin, span, |kind| match &stats {
            Some(stats) => format!("{} (avg: {:.1}{})", kind.name(), stats.axis(kind).average, kind.unit()),
            None        => kind.name().to_owned(),
        });
        scene.fill_curves(series);

        for kind in SeriesKind::ALL {
            let points = series
                .iter()
                .map(|s| (scene.x_of(s.timestamp), s.value(kind)))
                .collect();
            scene.panel_mut(kind).points = points;
        }
        scene.stats = stats.map(|s| s.lines()).unwrap_or_default();
        scene
    }

    /// `true` when there is nothing to draw ("no data" state).
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(|p| p.curve.is_empty() && p.points.is_empty())
    }

    pub fn x_of(&self, t: NaiveDateTime) -> f64 {
        seconds(t.signed_duration_since(self.origin))
    }

    pub fn panel(&self, kind: SeriesKind) -> &Panel {
        match kind {
            SeriesKind::Humidity    => &self.panels[0],
            SeriesKind::Temperature => &self.panels[1],
        }
    }

    fn panel_mut(&mut self, kind: SeriesKind) -> &mut Panel {
        match kind {
            SeriesKind::Humidity    => &mut self.panels[0],
            SeriesKind::Temperature => &mut self.panels[1],
        }
    }

    fn frame(
        title: &'static str,
        origin: NaiveDateTime,
        span: f64,
        legend: impl Fn(SeriesKind) -> String,
    ) -> Self {
        let end = origin + TimeDelta::milliseconds((span * 1000.0) as i64);
        Self {
            title,
            origin,
            span,
            panels: [
                Panel::new(SeriesKind::Humidity, legend(SeriesKind::Humidity)),
                Panel::new(SeriesKind::Temperature, legend(SeriesKind::Temperature)),
            ],
            hour_ticks: hour_ticks(origin, end),
            day_ticks: day_ticks(origin, end),
            stats: Vec::new(),
        }
    }

    fn fill_curves(&mut self, series: &Series) {
        let curve = smooth(series.as_slice());
        for kind in SeriesKind::ALL {
            let points = curve
                .iter()
                .map(|p| (self.x_of(p.timestamp), p.value(kind)))
                .collect();
            self.panel_mut(kind).curve = points;
        }
    }
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Six-hour boundaries inside `[start, end]`, thinned to at most
/// [`MAX_TICKS`] by widening the step in whole multiples of six hours.
pub fn hour_ticks(start: NaiveDateTime, end: NaiveDateTime) -> Vec<Tick> {
    let Some(first) = start
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
    else {
        return Vec::new();
    };
    let mut at = first;
    while at < start || at.hour() as i64 % MAJOR_TICK_HOURS != 0 {
        at += TimeDelta::hours(1);
    }

    let total = end.signed_duration_since(at).num_hours() / MAJOR_TICK_HOURS + 1;
    let stride = stride(total.max(0) as usize);
    let step = TimeDelta::hours(MAJOR_TICK_HOURS * stride as i64);

    let mut ticks = Vec::new();
    while at <= end {
        ticks.push(Tick {
            x:    seconds(at.signed_duration_since(start)),
            text: at.format("%H:%M").to_string(),
        });
        at += step;
    }
    ticks
}

/// Midnights inside `[start, end]`, labelled with the day they begin.
pub fn day_ticks(start: NaiveDateTime, end: NaiveDateTime) -> Vec<Tick> {
    let mut at = start.date().and_time(NaiveTime::MIN);
    if at < start {
        at += TimeDelta::days(1);
    }

    let total = end.signed_duration_since(at).num_days() + 1;
    let step = TimeDelta::days(stride(total.max(0) as usize) as i64);

    let mut ticks = Vec::new();
    while at <= end {
        ticks.push(Tick {
            x:    seconds(at.signed_duration_since(start)),
            text: at.format("%a %d %b").to_string(),
        });
        at += step;
    }
    ticks
}

fn stride(count: usize) -> usize {
    count.div_ceil(MAX_TICKS).max(1)
}
