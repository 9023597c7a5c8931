use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Write;
use temhumi_core::{AcquisitionEvent, Sample, Series};
use temhumi_sensor::local_now;
use temhumi_series::RollingSeries;
use temhumi_storage::Logger;
use tracing::{debug, error, info, warn};

/// Single owner of the live window and the log.
///
/// Every accepted sample goes to the window first and to the log second,
/// in the same call, so the two never drift apart. The async task in
/// [`spawn_acquisition`](crate::spawn_acquisition) only drives this type.
pub struct Acquirer<W: Write = File> {
    series: RollingSeries,
    logger: Option<Logger<W>>,
    clock:  fn() -> NaiveDateTime,
}

impl<W: Write> Acquirer<W> {
    /// `logger = None` keeps the session in memory only.
    pub fn new(series: RollingSeries, logger: Option<Logger<W>>) -> Self {
        Self {
            series,
            logger,
            clock: local_now,
        }
    }

    /// Replace the clock used by the eviction tick.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Offer one calibrated sample.
    ///
    /// Readings older than the newest accepted one are rejected with a
    /// warning and [`AcquisitionEvent::SampleRejected`]; this runs before the
    /// interval gate so a clock stepping backwards is reported, not hidden.
    /// Readings that arrive before the next sample is due are dropped
    /// silently. An accepted sample
    /// yields a fresh [`AcquisitionEvent::Snapshot`], preceded by
    /// [`AcquisitionEvent::LogWriteFailed`] when it could not be persisted.
    pub fn ingest(&mut self, sample: Sample) -> Vec<AcquisitionEvent> {
        let now = sample.timestamp;
        if let Err(e) = self.series.check_order(now) {
            warn!("Dropping sample: {e}");
            return vec![AcquisitionEvent::SampleRejected(e.to_string())];
        }
        if !self.series.sample_due(now) {
            debug!(
                "Reading skipped, next sample in {}s",
                self.series.until_due(now).num_seconds()
            );
            return Vec::new();
        }

        if let Err(e) = self.series.append(sample) {
            warn!("Dropping sample: {e}");
            return Vec::new();
        }
        self.series.mark_emitted(now);

        info!(
            "{} | Humidity: {:.1}% | Temperature: {:.1}°C",
            now.format("%Y-%m-%d %H:%M:%S"),
            sample.humidity,
            sample.temperature
        );

        let mut events = Vec::with_capacity(2);
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = logger.append(&sample) {
                error!("Log write failed, sample kept in memory only: {e}");
                events.push(AcquisitionEvent::LogWriteFailed(e.to_string()));
            }
        }
        events.push(AcquisitionEvent::Snapshot(self.series.snapshot()));
        events
    }

    /// Age the window against `now`. Returns a snapshot only when something
    /// was evicted.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<AcquisitionEvent> {
        if self.series.evict_stale(now) == 0 {
            return None;
        }
        if self.series.is_empty() {
            warn!("No samples within the window; sensor may have stalled");
        }
        Some(AcquisitionEvent::Snapshot(self.series.snapshot()))
    }

    pub fn snapshot(&self) -> Series {
        self.series.snapshot()
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn logger(&self) -> Option<&Logger<W>> {
        self.logger.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use std::time::Duration;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn at(secs: i64) -> Sample {
        Sample::new(t0() + TimeDelta::seconds(secs), 50.0, 21.0)
    }

    fn acquirer() -> Acquirer<Vec<u8>> {
        let series = RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600));
        Acquirer::new(series, Some(Logger::new(Vec::new())))
    }

    fn logged_rows(acq: &Acquirer<Vec<u8>>) -> usize {
        acq.logger()
            .map(|l| l.get_ref().iter().filter(|&&b| b == b'\n').count())
            .unwrap_or(0)
    }

    #[test]
    fn accepted_sample_is_windowed_and_logged() {
        let mut acq = acquirer();
        let events = acq.ingest(at(0));
        assert!(matches!(&events[..], [AcquisitionEvent::Snapshot(s)] if s.len() == 1));
        assert_eq!(logged_rows(&acq), 1);
    }

    #[test]
    fn readings_between_intervals_are_dropped() {
        let mut acq = acquirer();
        acq.ingest(at(0));
        assert!(acq.ingest(at(2)).is_empty());
        assert!(acq.ingest(at(599)).is_empty());
        assert_eq!(acq.ingest(at(600)).len(), 1);
        assert_eq!(acq.series().len(), 2);
        assert_eq!(logged_rows(&acq), 2);
    }

    #[test]
    fn reading_from_before_the_last_sample_is_rejected() {
        let mut acq = acquirer();
        acq.ingest(at(0));
        acq.ingest(at(600));
        let before = acq.snapshot();

        // Clock stepped back a minute: inside the interval, but stale.
        let events = acq.ingest(at(540));
        assert!(matches!(&events[..], [AcquisitionEvent::SampleRejected(reason)] if reason.contains("stale")));
        assert_eq!(acq.snapshot(), before);
        assert_eq!(logged_rows(&acq), 2);

        // The gate is untouched, so the next due reading still lands.
        assert_eq!(acq.ingest(at(1200)).len(), 1);
        assert_eq!(acq.series().len(), 3);
    }

    #[test]
    fn stale_reading_after_the_window_drained_is_rejected() {
        let mut acq = acquirer();
        acq.ingest(at(0));
        acq.tick(t0() + TimeDelta::seconds(4000));
        assert!(acq.series().is_empty());

        let events = acq.ingest(at(-60));
        assert!(matches!(&events[..], [AcquisitionEvent::SampleRejected(_)]));
        assert!(acq.series().is_empty());
        assert_eq!(logged_rows(&acq), 1);
    }

    #[test]
    fn log_failure_keeps_sample_in_memory() {
        struct ReadOnly;
        impl Write for ReadOnly {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let series = RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600));
        let mut acq = Acquirer::new(series, Some(Logger::new(ReadOnly)));
        let events = acq.ingest(at(0));

        assert!(matches!(events[0], AcquisitionEvent::LogWriteFailed(_)));
        assert!(matches!(&events[1], AcquisitionEvent::Snapshot(s) if s.len() == 1));
        // Next cycle is still attempted.
        assert_eq!(acq.ingest(at(600)).len(), 2);
        assert_eq!(acq.series().len(), 2);
    }

    #[test]
    fn tick_drains_a_stalled_window() {
        let mut acq = acquirer();
        acq.ingest(at(0));
        acq.ingest(at(600));

        assert!(acq.tick(t0() + TimeDelta::seconds(3600)).is_none());
        let drained = acq.tick(t0() + TimeDelta::seconds(4300));
        assert!(matches!(drained, Some(AcquisitionEvent::Snapshot(s)) if s.is_empty()));
        assert!(acq.tick(t0() + TimeDelta::seconds(9000)).is_none());
    }

    #[test]
    fn memory_only_session() {
        let series = RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600));
        let mut acq: Acquirer<Vec<u8>> = Acquirer::new(series, None);
        assert_eq!(acq.ingest(at(0)).len(), 1);
        assert_eq!(acq.snapshot().len(), 1);
    }
}
