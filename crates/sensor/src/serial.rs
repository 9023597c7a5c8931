use crate::reading::Calibration;
use crate::source::LineSource;
use serialport::{ClearBuffer, SerialPort};
use std::io::BufReader;
use std::time::Duration;
use temhumi_config::SerialConfig;
use temhumi_core::{Result, TemHumiError};
use tracing::info;

/// Line source reading from a serial device.
pub type SerialSource = LineSource<BufReader<Box<dyn SerialPort>>>;

/// Open the sensor port and wait for the board to come up.
///
/// Opening a USB serial port resets most boards, so stale bytes are cleared
/// and the call sleeps for `settle_secs` before the first read. This blocks
/// and belongs on a blocking thread.
pub fn open_serial(cfg: &SerialConfig, calibration: Calibration) -> Result<SerialSource> {
    info!("Connecting to {} at {} baud...", cfg.port, cfg.baud_rate);

    let port = serialport::new(&cfg.port, cfg.baud_rate)
        .timeout(Duration::from_millis(cfg.timeout_ms))
        .open()
        .map_err(|e| match e.kind() {
            // Bad settings fail the same way on every retry.
            serialport::ErrorKind::InvalidInput => {
                TemHumiError::Config(format!("invalid serial settings for {}: {e}", cfg.port))
            }
            _ => TemHumiError::Serial(format!("cannot open {}: {e}", cfg.port)),
        })?;

    port.clear(ClearBuffer::All)
        .map_err(|e| TemHumiError::Serial(format!("cannot flush {}: {e}", cfg.port)))?;

    if cfg.settle_secs > 0 {
        info!("Waiting {}s for the sensor board to reset...", cfg.settle_secs);
        std::thread::sleep(Duration::from_secs(cfg.settle_secs));
    }

    info!("Connected to {}", cfg.port);
    Ok(LineSource::new(BufReader::new(port), cfg.port.clone(), calibration))
}
