use chrono::TimeDelta;
use temhumi_core::{Series, SeriesKind};

/// Range and mean of one quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStats {
    pub min:     f64,
    pub max:     f64,
    pub average: f64,
}

/// Summary printed under historical plots.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub count:       usize,
    pub span:        TimeDelta,
    pub humidity:    AxisStats,
    pub temperature: AxisStats,
}

impl SeriesStats {
    /// `None` for an empty series.
    pub fn compute(series: &Series) -> Option<Self> {
        let (start, end) = series.bounds()?;
        Some(Self {
            count:       series.len(),
            span:        end.signed_duration_since(start),
            humidity:    axis(series, SeriesKind::Humidity),
            temperature: axis(series, SeriesKind::Temperature),
        })
    }

    pub fn axis(&self, kind: SeriesKind) -> AxisStats {
        match kind {
            SeriesKind::Humidity    => self.humidity,
            SeriesKind::Temperature => self.temperature,
        }
    }

    /// Human-readable lines: count, span, then one line per quantity.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Data Points: {}", self.count),
            format!("Time Span: {}", format_span(self.span)),
        ];
        for kind in SeriesKind::ALL {
            let a = self.axis(kind);
            let unit = kind.unit();
            lines.push(format!(
                "{}: {:.1}{unit} - {:.1}{unit} (avg: {:.1}{unit})",
                kind.name(),
                a.min,
                a.max,
                a.average
            ));
        }
        lines
    }
}

fn axis(series: &Series, kind: SeriesKind) -> AxisStats {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for s in series {
        let v = s.value(kind);
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    AxisStats {
        min,
        max,
        average: sum / series.len() as f64,
    }
}

/// `"2 days, 03:10:00"` / `"05:00:00"`.
pub fn format_span(span: TimeDelta) -> String {
    let total = span.num_seconds().max(0);
    let days = total / 86_400;
    let rest = total % 86_400;
    let hms = format!("{:02}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    match days {
        0 => hms,
        1 => format!("1 day, {hms}"),
        d => format!("{d} days, {hms}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use temhumi_core::Sample;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    #[test]
    fn empty_series_has_no_stats() {
        assert!(SeriesStats::compute(&Series::new()).is_none());
    }

    #[test]
    fn computes_ranges_and_means() {
        let s = Series::from_samples(vec![
            Sample::new(at(1, 0), 40.0, 18.0),
            Sample::new(at(1, 12), 60.0, 22.0),
            Sample::new(at(3, 3), 50.0, 26.0),
        ]);
        let stats = SeriesStats::compute(&s).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.humidity, AxisStats { min: 40.0, max: 60.0, average: 50.0 });
        assert_eq!(stats.temperature.max, 26.0);
        assert_eq!(stats.lines()[1], "Time Span: 2 days, 03:00:00");
        assert_eq!(stats.lines()[2], "Humidity: 40.0% - 60.0% (avg: 50.0%)");
    }

    #[test]
    fn span_covers_out_of_order_rows() {
        let s = Series::from_samples(vec![
            Sample::new(at(2, 6), 50.0, 20.0),
            Sample::new(at(3, 6), 50.0, 20.0),
            Sample::new(at(1, 6), 50.0, 20.0),
        ]);
        let stats = SeriesStats::compute(&s).unwrap();
        assert_eq!(stats.span, TimeDelta::days(2));
    }

    #[test]
    fn span_formatting() {
        assert_eq!(format_span(TimeDelta::seconds(3725)), "01:02:05");
        assert_eq!(format_span(TimeDelta::seconds(86_400 + 60)), "1 day, 00:01:00");
    }
}
