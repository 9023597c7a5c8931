//! Display-only smoothing.
//!
//! A natural cubic spline is fitted through the samples on the time axis,
//! independently for humidity and temperature, and sampled at
//! `DENSITY × N` evenly spaced instants. Fitting is a tridiagonal solve and
//! evaluation is a single forward sweep, so each call is O(N).

use chrono::{NaiveDateTime, TimeDelta};
use temhumi_core::{Sample, SeriesKind};

/// Output points produced per input sample.
pub const DENSITY: usize = 3;

/// One point on the smoothed curve. Not a [`Sample`]: it never gets stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothPoint {
    pub timestamp:   NaiveDateTime,
    pub humidity:    f64,
    pub temperature: f64,
}

impl SmoothPoint {
    #[inline]
    pub fn value(&self, kind: SeriesKind) -> f64 {
        match kind {
            SeriesKind::Humidity    => self.humidity,
            SeriesKind::Temperature => self.temperature,
        }
    }
}

impl From<&Sample> for SmoothPoint {
    fn from(s: &Sample) -> Self {
        Self {
            timestamp:   s.timestamp,
            humidity:    s.humidity,
            temperature: s.temperature,
        }
    }
}

/// Densify `samples` into a smooth curve.
///
/// - empty input → empty output
/// - one sample → the same point twice (a flat, zero-length line)
/// - two or more → `DENSITY × N` points whose first and last points equal
///   the first and last input samples exactly
pub fn smooth(samples: &[Sample]) -> Vec<SmoothPoint> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Vec::new();
    };
    if samples.len() == 1 {
        return vec![first.into(), first.into()];
    }

    let knots = Knots::from_samples(samples);
    if knots.xs.len() < 2 {
        // Every sample shares one timestamp.
        return vec![first.into(), last.into()];
    }

    let humidity    = Spline::fit(&knots.xs, &knots.humidity);
    let temperature = Spline::fit(&knots.xs, &knots.temperature);

    let count = (samples.len() * DENSITY).max(2);
    let x_end = knots.xs[knots.xs.len() - 1];
    let step  = x_end / (count - 1) as f64;

    let mut out = Vec::with_capacity(count);
    let mut segment = 0;
    for i in 0..count {
        let x = step * i as f64;
        while segment + 2 < knots.xs.len() && x > knots.xs[segment + 1] {
            segment += 1;
        }
        out.push(SmoothPoint {
            timestamp:   first.timestamp + TimeDelta::milliseconds((x * 1000.0).round() as i64),
            humidity:    humidity.eval(&knots.xs, segment, x),
            temperature: temperature.eval(&knots.xs, segment, x),
        });
    }

    if out.iter().any(|p| !p.humidity.is_finite() || !p.temperature.is_finite()) {
        tracing::warn!("Spline produced non-finite values; drawing raw points");
        return samples.iter().map(SmoothPoint::from).collect();
    }

    out[0] = first.into();
    out[count - 1] = last.into();
    out
}

/// Spline knots with strictly increasing x (seconds since the first sample).
struct Knots {
    xs:          Vec<f64>,
    humidity:    Vec<f64>,
    temperature: Vec<f64>,
}

impl Knots {
    fn from_samples(samples: &[Sample]) -> Self {
        let origin = samples[0].timestamp;
        let mut knots = Self {
            xs:          Vec::with_capacity(samples.len()),
            humidity:    Vec::with_capacity(samples.len()),
            temperature: Vec::with_capacity(samples.len()),
        };

        for s in samples {
            let x = s.timestamp.signed_duration_since(origin).num_milliseconds() as f64 / 1000.0;
            match knots.xs.last() {
                // Tied timestamps: the later arrival wins.
                Some(&prev) if x <= prev => {
                    let i = knots.xs.len() - 1;
                    knots.humidity[i]    = s.humidity;
                    knots.temperature[i] = s.temperature;
                }
                _ => {
                    knots.xs.push(x);
                    knots.humidity.push(s.humidity);
                    knots.temperature.push(s.temperature);
                }
            }
        }
        knots
    }
}

/// Natural cubic spline: knot values plus second derivatives.
struct Spline<'a> {
    ys: &'a [f64],
    m:  Vec<f64>,
}

impl<'a> Spline<'a> {
    fn fit(xs: &[f64], ys: &'a [f64]) -> Self {
        let n = xs.len();
        let mut m = vec![0.0; n];
        if n < 3 {
            return Self { ys, m };
        }

        // Thomas algorithm over the interior knots; natural ends keep m = 0.
        let interior = n - 2;
        let mut c_prime = vec![0.0; interior];
        let mut d_prime = vec![0.0; interior];

        for k in 0..interior {
            let i  = k + 1;
            let h0 = xs[i] - xs[i - 1];
            let h1 = xs[i + 1] - xs[i];
            let a  = h0;
            let b  = 2.0 * (h0 + h1);
            let c  = h1;
            let d  = 6.0 * ((ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0);

            if k == 0 {
                c_prime[k] = c / b;
                d_prime[k] = d / b;
            } else {
                let denom = b - a * c_prime[k - 1];
                c_prime[k] = c / denom;
                d_prime[k] = (d - a * d_prime[k - 1]) / denom;
            }
        }

        for k in (0..interior).rev() {
            let next = if k + 1 < interior { m[k + 2] } else { 0.0 };
            m[k + 1] = d_prime[k] - c_prime[k] * next;
        }

        Self { ys, m }
    }

    fn eval(&self, xs: &[f64], i: usize, x: f64) -> f64 {
        let (x0, x1) = (xs[i], xs[i + 1]);
        let h = x1 - x0;
        let (a, b) = (x1 - x, x - x0);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn series(points: &[(i64, f64, f64)]) -> Vec<Sample> {
        points
            .iter()
            .map(|&(secs, h, t)| Sample::new(at(secs), h, t))
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_curve() {
        assert!(smooth(&[]).is_empty());
    }

    #[test]
    fn single_sample_holds_flat() {
        let input = series(&[(0, 55.0, 22.0)]);
        let out = smooth(&input);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.humidity == 55.0 && p.temperature == 22.0));
    }

    #[test]
    fn endpoints_are_preserved() {
        let inputs = [
            series(&[(0, 50.0, 20.0), (600, 54.0, 21.0)]),
            series(&[(0, 50.0, 20.0), (600, 70.0, 25.0), (1200, 40.0, 18.0)]),
            series(&[
                (0, 61.3, 22.4),
                (600, 60.1, 22.9),
                (1200, 58.7, 23.5),
                (1800, 59.9, 23.1),
                (2400, 63.0, 22.0),
                (3000, 64.4, 21.7),
            ]),
        ];
        for input in &inputs {
            let out = smooth(input);
            assert_eq!(out.len(), input.len() * DENSITY);
            assert_eq!(out[0], SmoothPoint::from(&input[0]));
            assert_eq!(out[out.len() - 1], SmoothPoint::from(&input[input.len() - 1]));
        }
    }

    #[test]
    fn two_points_interpolate_linearly() {
        let out = smooth(&series(&[(0, 50.0, 20.0), (500, 60.0, 30.0)]));
        assert_eq!(out.len(), 6);
        // x = 200 s: 40 % of the way.
        assert!((out[2].humidity - 54.0).abs() < 1e-9);
        assert!((out[2].temperature - 24.0).abs() < 1e-9);
        assert_eq!(out[2].timestamp, at(200));
    }

    #[test]
    fn curve_passes_through_interior_knots() {
        // Uniform spacing with DENSITY = 3 over 3 samples: 9 outputs, step 150 s,
        // so output 4 lands on the middle knot at 600 s.
        let input = series(&[(0, 50.0, 20.0), (600, 70.0, 26.0), (1200, 40.0, 18.0)]);
        let out = smooth(&input);
        assert_eq!(out[4].timestamp, at(600));
        assert!((out[4].humidity - 70.0).abs() < 1e-9);
        assert!((out[4].temperature - 26.0).abs() < 1e-9);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let input = series(&[(0, 50.0, 20.0), (60, 52.0, 20.5), (600, 49.0, 21.0), (610, 48.0, 21.5)]);
        let out = smooth(&input);
        assert!(out.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn tied_timestamps_do_not_break_the_fit() {
        let input = series(&[(0, 50.0, 20.0), (600, 52.0, 21.0), (600, 53.0, 21.5), (1200, 51.0, 20.0)]);
        let out = smooth(&input);
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|p| p.humidity.is_finite() && p.temperature.is_finite()));
        assert_eq!(out[11], SmoothPoint::from(&input[3]));
    }

    #[test]
    fn all_samples_at_one_instant() {
        let input = series(&[(0, 50.0, 20.0), (0, 51.0, 21.0)]);
        let out = smooth(&input);
        assert_eq!(out, vec![SmoothPoint::from(&input[0]), SmoothPoint::from(&input[1])]);
    }
}
