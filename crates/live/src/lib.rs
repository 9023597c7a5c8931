//! Live monitor window.
//!
//! Owns the iced application loop and wires together:
//! - the acquisition pipeline (serial reader thread + window/log task)
//! - a redraw timer at the configured refresh interval
//!
//! The window only ever holds snapshots. A tick re-renders the latest one
//! against the current wall clock, so the plot keeps scrolling while the
//! sensor is quiet.

use chrono::TimeDelta;
use futures::channel::mpsc::Sender;
use futures::SinkExt;
use iced::{
    widget::{column, container, image, text},
    Element, Length, Subscription, Task,
};
use std::time::Duration;
use temhumi_acquisition::{spawn_acquisition, Acquirer};
use temhumi_config::MonitorConfig;
use temhumi_core::{AcquisitionEvent, Series};
use temhumi_renderer::{PlotScene, RenderSink, RgbaFrame};
use temhumi_sensor::{local_now, open_serial, Calibration};
use temhumi_series::RollingSeries;
use temhumi_storage::Logger;
use temhumi_theme::Theme;
use tracing::{error, info, warn};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Open the monitor window. Returns when the window is closed.
pub fn run(config: MonitorConfig) -> iced::Result {
    let size = iced::Size::new(config.render.width as f32, config.render.height as f32);

    iced::application(move || Monitor::new(config.clone()), Monitor::update, Monitor::view)
        .title(Monitor::title)
        .subscription(Monitor::subscription)
        .style(Monitor::style)
        .window_size(size)
        .run()
}

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Message {
    /// Redraw timer.
    Tick,
    /// Anything the acquisition pipeline reports.
    Acquisition(AcquisitionEvent),
}

// ── Session state ─────────────────────────────────────────────────────────────

/// What the window knows about the running session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Latest snapshot of the live window.
    pub series: Series,
    /// One-line status shown under the plot.
    pub status: String,
}

impl Session {
    pub fn apply(&mut self, event: AcquisitionEvent) {
        match event {
            AcquisitionEvent::Snapshot(series) => {
                self.series = series;
            }
            AcquisitionEvent::Connected(port) => {
                self.status = format!("Connected to {port}");
            }
            AcquisitionEvent::Disconnected(reason) => {
                self.status = format!("Sensor disconnected ({reason}); reconnecting");
            }
            AcquisitionEvent::SensorFault(reason) => {
                self.status = format!("Skipped bad reading: {reason}");
            }
            AcquisitionEvent::SampleRejected(reason) => {
                self.status = format!("Rejected out-of-order reading: {reason}");
            }
            AcquisitionEvent::LogWriteFailed(reason) => {
                self.status = format!("Log write failed, sample kept in memory: {reason}");
            }
        }
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

struct Monitor {
    config:  MonitorConfig,
    theme:   Theme,
    window:  TimeDelta,
    session: Session,
    frame:   RgbaFrame,
    image:   Option<image::Handle>,
}

impl Monitor {
    fn new(config: MonitorConfig) -> (Self, Task<Message>) {
        let theme  = Theme::from_config(&config.theme);
        let window = TimeDelta::from_std(config.window_duration()).unwrap_or(TimeDelta::MAX);
        let frame  = RgbaFrame::new((config.render.width, config.render.height), theme);

        info!(
            "Monitoring {} | window {}s | plot interval {} min",
            config.serial.port, config.window.time_window, config.window.plot_interval_minutes
        );

        let acquisition = Task::run(acquisition_stream(config.clone()), Message::Acquisition);
        let monitor = Self {
            config,
            theme,
            window,
            session: Session {
                series: Series::new(),
                status: String::from("Waiting for sensor..."),
            },
            frame,
            image: None,
        };

        (monitor, acquisition)
    }

    fn title(&self) -> String {
        match self.session.series.last() {
            Some(s) => format!("TemHumi | {:.1}% | {:.1}°C", s.humidity, s.temperature),
            None    => String::from("TemHumi"),
        }
    }

    // ── Update ────────────────────────────────────────────────────────────────

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => self.redraw(),
            Message::Acquisition(event) => self.session.apply(event),
        }
        Task::none()
    }

    fn redraw(&mut self) {
        let scene = PlotScene::live(&self.session.series, local_now(), self.window);
        match self.frame.draw(&scene) {
            Ok(()) => {
                let (width, height) = self.frame.size();
                self.image = Some(image::Handle::from_rgba(width, height, self.frame.pixels().to_vec()));
            }
            Err(e) => warn!("Frame skipped: {e}"),
        }
    }

    // ── View ──────────────────────────────────────────────────────────────────

    fn view(&self) -> Element<'_, Message> {
        let plot: Element<'_, Message> = match &self.image {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("Starting..."))
                .center(Length::Fill)
                .into(),
        };

        let status = text(self.session.status.as_str())
            .size(14)
            .color(self.theme.foreground.to_iced());

        column![plot, container(status).padding(6)]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(self.config.refresh_interval()).map(|_| Message::Tick)
    }

    // ── Style ─────────────────────────────────────────────────────────────────

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: self.theme.background.to_iced(),
            text_color:       self.theme.foreground.to_iced(),
        }
    }
}

// ── Acquisition stream ────────────────────────────────────────────────────────

/// Opens the log, starts acquisition and forwards its events to the window.
fn acquisition_stream(config: MonitorConfig) -> impl iced::futures::Stream<Item = AcquisitionEvent> {
    iced::stream::channel(32, move |mut sender: Sender<AcquisitionEvent>| async move {
        let logger = match Logger::open(&config.log.path, local_now()) {
            Ok(logger) => Some(logger),
            Err(e) => {
                error!("Cannot open log {}: {e}; samples stay in memory only", config.log.path.display());
                if sender.send(AcquisitionEvent::LogWriteFailed(e.to_string())).await.is_err() {
                    return; // window closed
                }
                None
            }
        };

        let series      = RollingSeries::new(config.window_duration(), config.aggregation_interval());
        let serial      = config.serial.clone();
        let calibration = Calibration::from_config(&config.calibration);
        let reconnect   = Duration::from_secs(config.serial.reconnect_secs);

        let mut rx = spawn_acquisition(
            Acquirer::new(series, logger),
            move || open_serial(&serial, calibration),
            reconnect,
        );

        while let Some(event) = rx.recv().await {
            if sender.send(event).await.is_err() {
                return; // window closed
            }
        }

        // Acquisition task exited; keep the window up with the last data.
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use temhumi_core::Sample;

    #[test]
    fn snapshots_replace_the_displayed_series() {
        let t = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        let mut session = Session::default();

        session.apply(AcquisitionEvent::Snapshot(Series::from_samples(vec![Sample::new(t, 50.0, 20.0)])));
        assert_eq!(session.series.len(), 1);

        session.apply(AcquisitionEvent::Snapshot(Series::new()));
        assert!(session.series.is_empty());
    }

    #[test]
    fn faults_keep_the_previous_window() {
        let t = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        let mut session = Session::default();
        session.apply(AcquisitionEvent::Snapshot(Series::from_samples(vec![Sample::new(t, 50.0, 20.0)])));

        session.apply(AcquisitionEvent::SensorFault("nan".into()));
        session.apply(AcquisitionEvent::LogWriteFailed("read-only".into()));
        assert_eq!(session.series.len(), 1);
        assert!(session.status.starts_with("Log write failed"));

        session.apply(AcquisitionEvent::Disconnected("unplugged".into()));
        assert!(session.status.contains("reconnecting"));
        assert_eq!(session.series.len(), 1);

        session.apply(AcquisitionEvent::SampleRejected("stale sample".into()));
        assert!(session.status.starts_with("Rejected out-of-order"));
        assert_eq!(session.series.len(), 1);
    }
}
