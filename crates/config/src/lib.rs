pub mod schema;

pub use schema::{
    CalibrationConfig, HistoricalConfig, LogConfig, MonitorConfig, RenderConfig, SerialConfig,
    ThemeConfig, WindowConfig,
};

use std::path::{Path, PathBuf};
use temhumi_core::{Result, TemHumiError};

/// Load configuration from a TOML file.  Returns `MonitorConfig::default()` if
/// the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(MonitorConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| TemHumiError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse a TOML document; missing sections and keys keep their defaults.
pub fn parse(raw: &str) -> Result<MonitorConfig> {
    toml::from_str(raw).map_err(|e| TemHumiError::Config(format!("TOML parse error: {e}")))
}

/// Full startup resolution: file, then process environment, then validation.
pub fn resolve(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let mut config = load(path)?;
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Apply `TIME_WINDOW`, `PLOT_INTERVAL_MINUTES`, `HUMIDITY_OFFSET` and
/// `TEMPERATURE_OFFSET` when `lookup` finds them.
///
/// Taking a lookup function keeps this independent of the real process
/// environment.
pub fn apply_overrides<F>(config: &mut MonitorConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TIME_WINDOW") {
        config.window.time_window = parse_var("TIME_WINDOW", &v)?;
    }
    if let Some(v) = lookup("PLOT_INTERVAL_MINUTES") {
        config.window.plot_interval_minutes = parse_var("PLOT_INTERVAL_MINUTES", &v)?;
    }
    if let Some(v) = lookup("HUMIDITY_OFFSET") {
        config.calibration.humidity_offset = parse_var("HUMIDITY_OFFSET", &v)?;
    }
    if let Some(v) = lookup("TEMPERATURE_OFFSET") {
        config.calibration.temperature_offset = parse_var("TEMPERATURE_OFFSET", &v)?;
    }
    Ok(())
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| TemHumiError::Config(format!("{key}={raw:?}: {e}")))
}

/// Longest accepted live window, in seconds.
pub const MAX_TIME_WINDOW: u64 = 366 * 86_400;

/// Reject configurations the monitor cannot run with.
pub fn validate(config: &MonitorConfig) -> Result<()> {
    let fail = |msg: &str| Err(TemHumiError::Config(msg.to_string()));

    if config.window.time_window == 0 {
        return fail("window.time_window must be positive");
    }
    if config.window.time_window > MAX_TIME_WINDOW {
        return fail("window.time_window must not exceed one year");
    }
    if config.window.plot_interval_minutes == 0 {
        return fail("window.plot_interval_minutes must be positive");
    }
    if config.historical.bucket_minutes == 0 {
        return fail("historical.bucket_minutes must be positive");
    }
    if config.render.refresh_ms == 0 {
        return fail("render.refresh_ms must be positive");
    }
    if !config.calibration.humidity_offset.is_finite()
        || !config.calibration.temperature_offset.is_finite()
    {
        return fail("calibration offsets must be finite numbers");
    }
    if config.render.width == 0 || config.render.height == 0 {
        return fail("render size must be non-zero");
    }
    if config.historical.width == 0 || config.historical.height == 0 {
        return fail("historical image size must be non-zero");
    }
    if config.serial.baud_rate == 0 {
        return fail("serial.baud_rate must be positive");
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("temhumi").join("temhumi.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.window_duration(), Duration::from_secs(86_400));
        assert_eq!(config.aggregation_interval(), Duration::from_secs(600));
        assert_eq!(config.refresh_interval(), Duration::from_millis(100));
        assert_eq!(config.calibration.humidity_offset, -4.0);
        assert_eq!(config.calibration.temperature_offset, -0.5);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = parse(
            r#"
            [window]
            time_window = 3600

            [serial]
            port = "/dev/cu.usbserial-31310"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.time_window, 3600);
        assert_eq!(config.window.plot_interval_minutes, 10);
        assert_eq!(config.serial.port, "/dev/cu.usbserial-31310");
        assert_eq!(config.serial.baud_rate, 9600);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = parse("[window\ntime_window = ").unwrap_err();
        assert!(matches!(err, TemHumiError::Config(_)));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = MonitorConfig::default();
        apply_overrides(
            &mut config,
            env(&[
                ("TIME_WINDOW", "7200"),
                ("PLOT_INTERVAL_MINUTES", "5"),
                ("HUMIDITY_OFFSET", "-2.5"),
                ("TEMPERATURE_OFFSET", " 1 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.window.time_window, 7200);
        assert_eq!(config.window.plot_interval_minutes, 5);
        assert_eq!(config.calibration.humidity_offset, -2.5);
        assert_eq!(config.calibration.temperature_offset, 1.0);
        // The historical bucket is its own knob.
        assert_eq!(config.historical.bucket_minutes, 10);
    }

    #[test]
    fn unparsable_override_names_the_variable() {
        let mut config = MonitorConfig::default();
        let err = apply_overrides(&mut config, env(&[("TIME_WINDOW", "a day")])).unwrap_err();
        assert!(err.to_string().contains("TIME_WINDOW"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = MonitorConfig::default();
        config.window.plot_interval_minutes = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut config = MonitorConfig::default();
        config.window.time_window = MAX_TIME_WINDOW + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn non_finite_offset_is_rejected() {
        let mut config = MonitorConfig::default();
        config.calibration.humidity_offset = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load("/nonexistent/temhumi/temhumi.toml").unwrap();
        assert_eq!(config, MonitorConfig::default());
    }
}
