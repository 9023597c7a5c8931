//! temhumi: serial temperature/humidity monitor and log plotter.
//!
//! Run with:  `RUST_LOG=info temhumi monitor`  or  `temhumi plot TemHumi.log`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use temhumi_config::MonitorConfig;
use temhumi_core::SeriesKind;
use temhumi_renderer::{PlotScene, PngExporter, RenderSink};
use temhumi_series::{aggregate_buckets, SeriesStats};
use temhumi_theme::Theme;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "temhumi", version, about = "Temperature and humidity monitor")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/temhumi/temhumi.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read the sensor, log samples and show the rolling plot.
    Monitor {
        /// Serial device of the sensor.
        #[arg(long)]
        port: Option<String>,
        /// Log file to append to.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Plot a whole log file to a PNG image.
    Plot {
        /// Log file to read (default: the configured log).
        log: Option<PathBuf>,
        /// Output image.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Averaging bucket width in minutes.
        #[arg(long)]
        bucket_minutes: Option<u64>,
    },
}

fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("temhumi v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(temhumi_config::default_path);
    let mut config = temhumi_config::resolve(&config_path)
        .with_context(|| format!("invalid configuration ({})", config_path.display()))?;

    match cli.command {
        Command::Monitor { port, log } => {
            if let Some(port) = port {
                config.serial.port = port;
            }
            if let Some(log) = log {
                config.log.path = log;
            }
            temhumi_config::validate(&config)?;
            monitor(config)
        }
        Command::Plot { log, output, bucket_minutes } => {
            if let Some(output) = output {
                config.historical.output = output;
            }
            if let Some(minutes) = bucket_minutes {
                config.historical.bucket_minutes = minutes;
            }
            temhumi_config::validate(&config)?;
            let log = log.unwrap_or_else(|| config.log.path.clone());
            plot(&config, &log)
        }
    }
}

fn monitor(config: MonitorConfig) -> Result<()> {
    info!(
        "Calibration offsets: humidity {:+.1}%, temperature {:+.1}°C",
        config.calibration.humidity_offset, config.calibration.temperature_offset
    );
    info!(
        "Logging to {} every {} minute(s)",
        config.log.path.display(),
        config.window.plot_interval_minutes
    );
    temhumi_live::run(config).context("cannot open the monitor window")
}

fn plot(config: &MonitorConfig, log: &Path) -> Result<()> {
    let loaded = temhumi_storage::load_log(log)
        .with_context(|| format!("cannot read log file {}", log.display()))?;
    info!("Loaded {} data points ({} skipped)", loaded.series.len(), loaded.skipped);

    let Some(raw) = SeriesStats::compute(&loaded.series) else {
        bail!("no valid data found in {}", log.display());
    };
    if let Some((start, end)) = loaded.series.bounds() {
        info!("Time range: {start} to {end}");
    }
    for kind in SeriesKind::ALL {
        let axis = raw.axis(kind);
        info!("{} range: {:.1}{unit} to {:.1}{unit}", kind.name(), axis.min, axis.max, unit = kind.unit());
    }

    let buckets = aggregate_buckets(&loaded.series, config.bucket_duration());
    info!(
        "Aggregated to {} data points ({}-minute intervals)",
        buckets.len(),
        config.historical.bucket_minutes
    );

    let scene = PlotScene::historical(&buckets);
    let size = (config.historical.width, config.historical.height);
    let mut exporter = PngExporter::new(&config.historical.output, size, Theme::from_config(&config.theme));
    exporter
        .draw(&scene)
        .with_context(|| format!("cannot write {}", exporter.path().display()))?;
    Ok(())
}
