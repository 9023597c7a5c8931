//! Acquisition pipeline: sensor → rolling window → log.
//!
//! Blocking serial reads run on a dedicated thread. A Tokio task owns the
//! [`Acquirer`] and is the only writer of the window and the log; readers
//! get owned [`Series`](temhumi_core::Series) copies through the returned
//! channel.

pub mod acquirer;

pub use acquirer::Acquirer;

use std::io::Write;
use std::time::Duration;
use temhumi_core::{AcquisitionEvent, Result, Sample, TemHumiError};
use temhumi_sensor::SampleSource;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

/// How often the window is aged when no samples arrive.
pub const EVICTION_TICK: Duration = Duration::from_secs(1);

/// What the reader thread hands to the acquisition task.
enum Feed {
    Sample(Sample),
    Status(AcquisitionEvent),
}

/// Spawn the reader thread and the acquisition task.
///
/// `open` is called on the reader thread for the first session and again
/// after every disconnect, `reconnect` apart. Both stop once the returned
/// receiver is dropped. Must be called from inside a Tokio runtime.
pub fn spawn_acquisition<S, F, W>(
    mut acquirer: Acquirer<W>,
    open: F,
    reconnect: Duration,
) -> mpsc::Receiver<AcquisitionEvent>
where
    S: SampleSource + 'static,
    F: FnMut() -> Result<S> + Send + 'static,
    W: Write + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let (feed_tx, mut feed_rx) = mpsc::channel(16);

    let reader = std::thread::Builder::new()
        .name("sensor-reader".into())
        .spawn(move || read_loop(open, reconnect, feed_tx));
    if let Err(e) = reader {
        error!("Cannot start sensor reader thread: {e}");
    }

    tokio::spawn(async move {
        let mut ticker = time::interval(EVICTION_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let events = tokio::select! {
                feed = feed_rx.recv() => match feed {
                    Some(Feed::Sample(sample)) => acquirer.ingest(sample),
                    Some(Feed::Status(event))  => vec![event],
                    None => break, // reader thread gone
                },
                _ = ticker.tick() => {
                    let now = acquirer.now();
                    acquirer.tick(now).into_iter().collect()
                }
            };

            for event in events {
                if tx.send(event).await.is_err() {
                    return; // all receivers dropped
                }
            }
        }

        warn!("Sensor reader stopped; acquisition finished");
    });

    rx
}

/// Blocking read loop. Reconnects on any non-transient source error and
/// gives up when opening fails with an unrecoverable one.
fn read_loop<S, F>(mut open: F, reconnect: Duration, feed: mpsc::Sender<Feed>)
where
    S: SampleSource,
    F: FnMut() -> Result<S>,
{
    loop {
        match open() {
            Ok(mut source) => {
                let name = source.name().to_owned();
                if feed.blocking_send(Feed::Status(AcquisitionEvent::Connected(name.clone()))).is_err() {
                    return;
                }

                loop {
                    let sent = match source.next_sample() {
                        Ok(Some(sample)) => feed.blocking_send(Feed::Sample(sample)),
                        Ok(None) if feed.is_closed() => return,
                        Ok(None) => continue,
                        Err(TemHumiError::TransientSensor(reason)) => {
                            warn!("{name}: skipping bad read: {reason}");
                            feed.blocking_send(Feed::Status(AcquisitionEvent::SensorFault(reason)))
                        }
                        Err(e) => {
                            warn!(
                                "{name} disconnected: {e}; reconnecting in {}s",
                                reconnect.as_secs_f64()
                            );
                            if feed.blocking_send(Feed::Status(AcquisitionEvent::Disconnected(e.to_string()))).is_err() {
                                return;
                            }
                            break;
                        }
                    };
                    if sent.is_err() {
                        return;
                    }
                }
            }
            Err(e) if !e.is_recoverable() => {
                error!("Cannot open sensor: {e}; not retrying");
                if feed.blocking_send(Feed::Status(AcquisitionEvent::Disconnected(e.to_string()))).is_err() {
                    warn!("Acquisition task already stopped");
                }
                return;
            }
            Err(e) => {
                error!("Cannot open sensor: {e}; retrying in {}s", reconnect.as_secs_f64());
            }
        }

        if feed.is_closed() {
            return;
        }
        std::thread::sleep(reconnect);
        info!("Reconnecting to sensor...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use std::collections::VecDeque;
    use temhumi_series::RollingSeries;
    use temhumi_storage::Logger;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    /// Replays a fixed script, then reports the stream as closed.
    struct Scripted {
        steps: VecDeque<Result<Option<Sample>>>,
    }

    impl SampleSource for Scripted {
        fn next_sample(&mut self) -> Result<Option<Sample>> {
            self.steps.pop_front().unwrap_or_else(|| {
                Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed").into())
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn events_follow_the_source_in_order() {
        let sample = |mins: i64, h: f64| Sample::new(t0() + TimeDelta::minutes(mins), h, 21.0);
        let mut opened = false;
        let open = move || {
            if opened {
                return Err(TemHumiError::Serial("unplugged".into()));
            }
            opened = true;
            Ok(Scripted {
                steps: VecDeque::from(vec![
                    Ok(Some(sample(0, 50.0))),
                    Ok(None),
                    Err(TemHumiError::TransientSensor("nan".into())),
                    Ok(Some(sample(1, 51.0))), // before the interval: dropped
                    Ok(Some(sample(10, 52.0))),
                ]),
            })
        };

        let series   = RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600));
        let acquirer = Acquirer::new(series, Some(Logger::new(Vec::new()))).with_clock(t0);
        let mut rx   = spawn_acquisition(acquirer, open, Duration::from_millis(10));

        let mut events = Vec::new();
        while events.len() < 5 {
            let next = time::timeout(Duration::from_secs(5), rx.recv()).await;
            match next {
                Ok(Some(event)) => events.push(event),
                _ => break,
            }
        }

        assert!(matches!(&events[0], AcquisitionEvent::Connected(name) if name == "scripted"));
        assert!(matches!(&events[1], AcquisitionEvent::Snapshot(s) if s.len() == 1));
        assert!(matches!(&events[2], AcquisitionEvent::SensorFault(_)));
        assert!(matches!(&events[3], AcquisitionEvent::Snapshot(s) if s.len() == 2));
        assert!(matches!(&events[4], AcquisitionEvent::Disconnected(_)));
    }

    #[tokio::test]
    async fn unrecoverable_open_error_stops_the_reader() {
        let mut attempts = 0;
        let open = move || -> Result<Scripted> {
            attempts += 1;
            assert_eq!(attempts, 1, "reader retried an unrecoverable error");
            Err(TemHumiError::Config("invalid baud rate".into()))
        };

        let series   = RollingSeries::new(Duration::from_secs(3600), Duration::from_secs(600));
        let acquirer = Acquirer::new(series, Some(Logger::new(Vec::new()))).with_clock(t0);
        let mut rx   = spawn_acquisition(acquirer, open, Duration::from_millis(10));

        let first = time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(first, Ok(Some(AcquisitionEvent::Disconnected(reason))) if reason.contains("baud")));

        // Reader gone, so the task finishes and the channel closes.
        let rest = time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(rest, Ok(None)));
    }
}
