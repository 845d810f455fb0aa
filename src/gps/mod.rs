//! # GPS Module
//!
//! GPS fix acquisition and timestamp synthesis.
//!
//! This module handles:
//! - Polling raw fix fields (time, date, position, validity) once per cycle
//! - Parsing the minimal RMC sentence fields from a serial NMEA receiver
//! - Synthesizing canonical UTC timestamps from raw GPS integers
//! - A control seam for receivers that accept binary command protocols
//!
//! Receiver configuration itself is out of scope; [`GpsReceiverControl`]
//! only exposes the one-shot seam.

pub mod nmea;
pub mod timestamp;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{GeigerLogError, Result};

/// Default NMEA receiver baud rate
pub const GPS_BAUD_RATE: u32 = 9_600;

/// Lines to scan per poll before giving up on finding an RMC sentence.
///
/// Receivers emit a handful of sentence types per second; well under 32
/// lines separate consecutive RMC sentences on any real module.
const MAX_LINES_PER_POLL: usize = 32;

/// Raw GPS fix fields as the receiver reports them.
///
/// `time` is HHMMSS and `date` is DDMMYY, both as plain integers. Not
/// retained beyond one record cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// UTC time of day, HHMMSS
    pub time: u32,
    /// UTC date, DDMMYY
    pub date: u32,
    /// Latitude in signed decimal degrees
    pub latitude: f64,
    /// Longitude in signed decimal degrees
    pub longitude: f64,
    /// Receiver lock flag; nothing else in the fix is trustworthy when false
    pub valid: bool,
}

/// Source of raw GPS fixes, polled synchronously once per reporting cycle.
#[async_trait]
pub trait GpsSource: Send {
    /// Obtain the most recent raw fix from the receiver.
    async fn poll_fix(&mut self) -> Result<GpsFix>;
}

/// One-shot control seam for receivers with binary command protocols.
///
/// The logger never owns receiver configuration; the surrounding system may
/// invoke this once at startup for modules that need programming.
#[async_trait]
pub trait GpsReceiverControl: Send {
    /// Apply the receiver settings for logging use.
    async fn apply_settings(&mut self) -> Result<()>;

    /// Send one raw command message to the receiver.
    async fn send_message(&mut self, message: &[u8]) -> Result<()>;
}

/// Serial NMEA receiver adapter.
///
/// Reads sentences line-by-line and surfaces the RMC fields as a [`GpsFix`].
pub struct SerialGpsSource {
    reader: BufReader<tokio_serial::SerialStream>,
    device_path: String,
    line: String,
}

impl std::fmt::Debug for SerialGpsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialGpsSource")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SerialGpsSource {
    /// Open the GPS receiver serial port with 8N1 settings.
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Receiver line rate (typically 9600)
    ///
    /// # Errors
    ///
    /// Returns [`GeigerLogError::Serial`] if the port cannot be opened
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        debug!("Opening GPS receiver at {} ({} baud)", path, baud_rate);

        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GeigerLogError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("GPS receiver opened at {}", path);

        Ok(Self {
            reader: BufReader::new(port),
            device_path: path.to_string(),
            line: String::with_capacity(128),
        })
    }

    /// Device path of the opened receiver port.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl GpsSource for SerialGpsSource {
    async fn poll_fix(&mut self) -> Result<GpsFix> {
        for _ in 0..MAX_LINES_PER_POLL {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .await
                .map_err(|e| GeigerLogError::Gps(format!("GPS line read failed: {}", e)))?;

            if read == 0 {
                return Err(GeigerLogError::Gps("GPS stream closed".to_string()));
            }

            if !nmea::is_rmc(self.line.trim_end()) {
                continue;
            }

            match nmea::parse_rmc(&self.line) {
                Ok(fix) => return Ok(fix),
                Err(e) => {
                    // A corrupted sentence is routine on a serial line; keep
                    // scanning within the poll budget.
                    warn!("Discarding corrupted RMC sentence: {}", e);
                    continue;
                }
            }
        }

        Err(GeigerLogError::Gps(format!(
            "no RMC sentence within {} lines",
            MAX_LINES_PER_POLL
        )))
    }
}

#[async_trait]
impl GpsReceiverControl for SerialGpsSource {
    async fn apply_settings(&mut self) -> Result<()> {
        // NMEA receivers need no programming; factory defaults already emit
        // RMC. Binary-protocol modules override via send_message.
        debug!("GPS receiver at {} left on factory settings", self.device_path);
        Ok(())
    }

    async fn send_message(&mut self, message: &[u8]) -> Result<()> {
        self.reader
            .get_mut()
            .write_all(message)
            .await
            .map_err(|e| GeigerLogError::Serial(format!("GPS command write failed: {}", e)))?;
        self.reader
            .get_mut()
            .flush()
            .await
            .map_err(|e| GeigerLogError::Serial(format!("GPS command flush failed: {}", e)))?;

        debug!("Sent GPS command ({} bytes)", message.len());
        Ok(())
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Mock GPS source replaying a scripted sequence of poll results
    pub struct MockGpsSource {
        fixes: Vec<Result<GpsFix>>,
    }

    impl MockGpsSource {
        /// Replays `fixes` in order; panics if polled past the script.
        pub fn new(fixes: Vec<Result<GpsFix>>) -> Self {
            let mut fixes = fixes;
            fixes.reverse();
            Self { fixes }
        }

        pub fn with_fix(fix: GpsFix) -> Self {
            Self::new(vec![Ok(fix)])
        }
    }

    #[async_trait]
    impl GpsSource for MockGpsSource {
        async fn poll_fix(&mut self) -> Result<GpsFix> {
            self.fixes.pop().expect("mock GPS polled past its script")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockGpsSource;
    use super::*;

    fn locked_fix() -> GpsFix {
        GpsFix {
            time: 235959,
            date: 311299,
            latitude: 35.6580,
            longitude: 139.7016,
            valid: true,
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(GPS_BAUD_RATE, 9_600);
        assert!(MAX_LINES_PER_POLL >= 8, "poll budget must span several sentence bursts");
    }

    #[test]
    fn test_open_with_invalid_path_returns_error() {
        let result = SerialGpsSource::open("/dev/nonexistent_gps_device_12345", GPS_BAUD_RATE);

        assert!(result.is_err());
        match result.unwrap_err() {
            GeigerLogError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_gps_device_12345"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_source_replays_script() {
        let mut source = MockGpsSource::new(vec![
            Ok(locked_fix()),
            Err(GeigerLogError::Gps("stream closed".to_string())),
        ]);

        assert!(source.poll_fix().await.unwrap().valid);
        assert!(source.poll_fix().await.is_err());
    }
}
