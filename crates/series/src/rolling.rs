use chrono::{NaiveDateTime, TimeDelta};
use std::collections::VecDeque;
use std::time::Duration;
use temhumi_core::{Result, Sample, Series, TemHumiError};

/// The live window: samples from the last `window` of wall-clock time.
///
/// Eviction is strict FIFO by age and runs on every append, so memory stays
/// at roughly `window / interval` samples. The series does not down-sample:
/// callers throttle acquisition through [`sample_due`](Self::sample_due) and
/// every monotonic sample handed to [`append`](Self::append) is kept.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    samples:   VecDeque<Sample>,
    window:    TimeDelta,
    interval:  TimeDelta,
    last_emit: Option<NaiveDateTime>,
}

impl RollingSeries {
    pub fn new(window: Duration, interval: Duration) -> Self {
        let window   = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        let interval = TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX);
        let expected = window
            .num_seconds()
            .checked_div(interval.num_seconds())
            .unwrap_or(0)
            .clamp(0, 4096) as usize;

        Self {
            samples: VecDeque::with_capacity(expected + 1),
            window,
            interval,
            last_emit: None,
        }
    }

    /// Insert `sample` at the tail, then drop every sample that fell out of
    /// the window relative to `sample.timestamp`.
    ///
    /// A timestamp failing [`check_order`](Self::check_order) is rejected
    /// with [`TemHumiError::StaleSample`] and leaves the series untouched. Equal
    /// timestamps are accepted in arrival order. Returns how many samples
    /// were evicted.
    pub fn append(&mut self, sample: Sample) -> Result<usize> {
        self.check_order(sample.timestamp)?;
        self.samples.push_back(sample);
        Ok(self.evict_stale(sample.timestamp))
    }

    /// Reject `timestamp` if it is earlier than the newest sample this
    /// series has retained or emitted. The emit mark outlives eviction, so
    /// a drained window still refuses readings from before it drained.
    pub fn check_order(&self, timestamp: NaiveDateTime) -> Result<()> {
        let newest = self.samples.back().map(|s| s.timestamp).max(self.last_emit);
        match newest {
            Some(latest) if timestamp < latest => Err(TemHumiError::StaleSample { timestamp, latest }),
            _ => Ok(()),
        }
    }

    /// Drop samples older than `now - window`. A sample exactly `window` old
    /// is kept.
    pub fn evict_stale(&mut self, now: NaiveDateTime) -> usize {
        let mut evicted = 0;
        while let Some(front) = self.samples.front() {
            if now.signed_duration_since(front.timestamp) <= self.window {
                break;
            }
            self.samples.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!("Evicted {evicted} sample(s) older than the window");
        }
        evicted
    }

    /// `true` when at least one interval has passed since the last emitted
    /// sample, or nothing has been emitted yet. Callers that act on `true`
    /// must follow up with [`mark_emitted`](Self::mark_emitted).
    pub fn sample_due(&self, now: NaiveDateTime) -> bool {
        match self.last_emit {
            None       => true,
            Some(last) => now.signed_duration_since(last) >= self.interval,
        }
    }

    pub fn mark_emitted(&mut self, now: NaiveDateTime) {
        self.last_emit = Some(now);
    }

    /// Time left until the next sample is due, zero if already due.
    pub fn until_due(&self, now: NaiveDateTime) -> TimeDelta {
        match self.last_emit {
            None       => TimeDelta::zero(),
            Some(last) => (self.interval - now.signed_duration_since(last)).max(TimeDelta::zero()),
        }
    }

    /// Owned copy of the window, safe to hand to another task.
    pub fn snapshot(&self) -> Series {
        Series::from_samples(self.samples.iter().copied().collect())
    }

    /// `(earliest, latest)` of the current window, `None` when empty.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.samples.front()?.timestamp, self.samples.back()?.timestamp))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn at(secs: i64) -> NaiveDateTime {
        t0() + TimeDelta::seconds(secs)
    }

    fn sample(secs: i64) -> Sample {
        Sample::new(at(secs), 50.0 + secs as f64 / 600.0, 20.0)
    }

    fn hour_window() -> RollingSeries {
        RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600))
    }

    #[test]
    fn eight_samples_over_seventy_minutes_keep_seven() {
        let mut series = hour_window();
        let mut evicted = 0;
        for i in 0..8 {
            evicted += series.append(sample(i * 600)).unwrap();
        }
        assert_eq!(evicted, 1);
        assert_eq!(series.len(), 7);
        assert_eq!(series.bounds(), Some((at(600), at(4200))));
    }

    #[test]
    fn sample_exactly_one_window_old_is_retained() {
        let mut series = hour_window();
        series.append(sample(0)).unwrap();
        series.append(sample(3600)).unwrap();
        assert_eq!(series.len(), 2);
        series.append(sample(3601)).unwrap();
        assert_eq!(series.bounds(), Some((at(3600), at(3601))));
    }

    #[test]
    fn every_retained_sample_is_inside_the_window() {
        let mut series = RollingSeries::new(Duration::from_secs(1800), Duration::from_secs(60));
        let steps = [0, 45, 300, 301, 900, 2000, 2100, 2100, 5000, 5003, 6900];
        for secs in steps {
            series.append(sample(secs)).unwrap();
            let now = at(secs);
            for s in series.snapshot().iter() {
                assert!(now.signed_duration_since(s.timestamp) <= series.window());
            }
        }
    }

    #[test]
    fn out_of_order_append_is_rejected_without_mutation() {
        let mut series = hour_window();
        series.append(sample(600)).unwrap();
        series.append(sample(1200)).unwrap();
        let before = series.snapshot();

        let err = series.append(sample(900)).unwrap_err();
        assert!(matches!(err, TemHumiError::StaleSample { .. }));
        assert_eq!(series.snapshot(), before);

        // Rejecting again changes nothing either.
        assert!(series.append(sample(0)).is_err());
        assert_eq!(series.snapshot(), before);
    }

    #[test]
    fn drained_window_still_rejects_older_readings() {
        let mut series = hour_window();
        series.append(sample(600)).unwrap();
        series.mark_emitted(at(600));
        series.evict_stale(at(5000));
        assert!(series.is_empty());

        let err = series.check_order(at(300)).unwrap_err();
        assert!(matches!(err, TemHumiError::StaleSample { latest, .. } if latest == at(600)));
        assert!(series.append(sample(300)).is_err());
        assert!(series.is_empty());
        assert!(series.check_order(at(600)).is_ok());
    }

    #[test]
    fn equal_timestamps_are_kept_in_arrival_order() {
        let mut series = hour_window();
        series.append(Sample::new(at(10), 40.0, 20.0)).unwrap();
        series.append(Sample::new(at(10), 41.0, 21.0)).unwrap();
        let snap = series.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.last().map(|s| s.humidity), Some(41.0));
    }

    #[test]
    fn stalled_source_drains_to_empty() {
        let mut series = hour_window();
        series.append(sample(0)).unwrap();
        series.append(sample(600)).unwrap();
        assert_eq!(series.evict_stale(at(3700)), 1);
        assert_eq!(series.evict_stale(at(4201)), 1);
        assert!(series.is_empty());
        assert_eq!(series.bounds(), None);
        assert!(series.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let mut series = hour_window();
        series.append(sample(0)).unwrap();
        let snap = series.snapshot();
        series.append(sample(600)).unwrap();
        series.append(sample(4000)).unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.first().map(|s| s.timestamp), Some(at(0)));
    }

    #[test]
    fn sample_due_gates_on_interval() {
        let mut series = hour_window();
        assert!(series.sample_due(at(0)));
        series.mark_emitted(at(0));
        assert!(!series.sample_due(at(599)));
        assert_eq!(series.until_due(at(300)), TimeDelta::seconds(300));
        assert!(series.sample_due(at(600)));
        assert_eq!(series.until_due(at(700)), TimeDelta::zero());
    }
}
