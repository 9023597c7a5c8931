//! Coarse averaging for long historical plots.
//!
//! This is display-only aggregation over already-collected data and is
//! independent of the live acquisition interval.

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::BTreeMap;
use std::time::Duration;
use temhumi_core::{Sample, Series};

/// Average `series` into fixed-width buckets.
///
/// Buckets are aligned to multiples of `bucket` since midnight of the
/// earliest day, so the first bucket starts at the earliest timestamp
/// rounded down to a bucket boundary. Each non-empty bucket becomes one
/// sample stamped at the bucket midpoint; empty buckets are skipped.
/// Input order does not matter.
pub fn aggregate_buckets(series: &Series, bucket: Duration) -> Series {
    let Some(origin) = series.iter().map(|s| s.timestamp).min() else {
        return Series::new();
    };
    let width = bucket.as_secs().max(1) as i64;
    let epoch = origin.date().and_time(chrono::NaiveTime::MIN);

    let mut sums: BTreeMap<i64, Accumulator> = BTreeMap::new();
    for s in series {
        let offset = s.timestamp.signed_duration_since(epoch).num_seconds();
        sums.entry(offset.div_euclid(width)).or_default().add(s);
    }

    let samples = sums
        .into_iter()
        .map(|(index, acc)| {
            let start = epoch + TimeDelta::seconds(index * width);
            acc.mean(midpoint(start, width))
        })
        .collect();

    Series::from_samples(samples)
}

fn midpoint(start: NaiveDateTime, width_secs: i64) -> NaiveDateTime {
    start + TimeDelta::milliseconds(width_secs * 500)
}

#[derive(Debug, Default)]
struct Accumulator {
    humidity:    f64,
    temperature: f64,
    count:       usize,
}

impl Accumulator {
    fn add(&mut self, s: &Sample) {
        self.humidity += s.humidity;
        self.temperature += s.temperature;
        self.count += 1;
    }

    fn mean(&self, timestamp: NaiveDateTime) -> Sample {
        let n = self.count as f64;
        Sample::new(timestamp, self.humidity / n, self.temperature / n)
    }
}
