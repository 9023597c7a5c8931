use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `temhumi.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Live window length and acquisition cadence.
    pub window: WindowConfig,
    /// Offsets applied to raw readings before they become samples.
    pub calibration: CalibrationConfig,
    /// Serial transport to the sensor board.
    pub serial: SerialConfig,
    /// Durable CSV log.
    pub log: LogConfig,
    /// Live window rendering.
    pub render: RenderConfig,
    /// Offline plot of the whole log.
    pub historical: HistoricalConfig,
    /// Plot colours.
    pub theme: ThemeConfig,
}

impl MonitorConfig {
    /// `window_duration`: how far back the live series reaches.
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window.time_window)
    }

    /// `aggregation_interval`: minimum spacing between acquired samples.
    pub fn aggregation_interval(&self) -> Duration {
        Duration::from_secs(self.window.plot_interval_minutes * 60)
    }

    /// Bucket size for the historical display aggregation.
    ///
    /// Deliberately separate from [`Self::aggregation_interval`].
    pub fn bucket_duration(&self) -> Duration {
        Duration::from_secs(self.historical.bucket_minutes * 60)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.render.refresh_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Seconds of history kept in memory (`TIME_WINDOW`).
    pub time_window: u64,
    /// Minutes between acquired samples (`PLOT_INTERVAL_MINUTES`).
    pub plot_interval_minutes: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            time_window:           60 * 60 * 24,
            plot_interval_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Percentage points added to raw humidity (`HUMIDITY_OFFSET`).
    pub humidity_offset: f64,
    /// Degrees Celsius added to raw temperature (`TEMPERATURE_OFFSET`).
    pub temperature_offset: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            humidity_offset:    -4.0,
            temperature_offset: -0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout per poll.
    pub timeout_ms: u64,
    /// Pause after opening while the board resets.
    pub settle_secs: u64,
    /// Delay before reopening a lost or unavailable port.
    pub reconnect_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port:           "/dev/ttyUSB0".to_string(),
            baud_rate:      9600,
            timeout_ms:     1000,
            settle_secs:    3,
            reconnect_secs: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("TemHumi.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Redraw cadence of the live window.
    pub refresh_ms: u64,
    /// Window size in logical pixels.
    pub width:  u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 100,
            width:      1200,
            height:     1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalConfig {
    /// Width of the averaging buckets used for long-range plots.
    pub bucket_minutes: u64,
    /// PNG written by the non-interactive plot.
    pub output: PathBuf,
    /// Image size in pixels.
    pub width:  u32,
    pub height: u32,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 10,
            output:         PathBuf::from("temhumi_plot.png"),
            width:          2800,
            height:         2000,
        }
    }
}

/// Plot palette as hex strings (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background:  String,
    pub foreground:  String,
    pub grid:        String,
    pub humidity:    String,
    pub temperature: String,
    /// START label fill.
    pub start:       String,
    /// Six-hour milestone label fill.
    pub milestone:   String,
    /// Secondary (date) axis labels.
    pub date_label:  String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background:  "#000000".to_string(),
            foreground:  "#FFFFFF".to_string(),
            grid:        "#808080".to_string(),
            humidity:    "#00BFFF".to_string(), // deep sky blue
            temperature: "#FF6347".to_string(), // tomato
            start:       "#00FF00".to_string(),
            milestone:   "#FFD700".to_string(), // gold
            date_label:  "#FFFF00".to_string(),
        }
    }
}
