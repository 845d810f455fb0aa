//! # Detector Module
//!
//! Adapter between the Geiger detector board and the pulse counter.
//!
//! The detector board raises one byte on its serial line per detected pulse
//! (the hardware interrupt line, surfaced over USB serial). This module only
//! pumps those events into a [`PulseHandle`]; the counter itself is testable
//! without it by injecting pulses through the handle directly.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, trace};

use crate::counter::PulseHandle;
use crate::error::{GeigerLogError, Result};

/// Default detector board line rate
pub const DETECTOR_BAUD_RATE: u32 = 115_200;

/// Read chunk size; pulse bursts from hot sources arrive faster than one
/// byte per read
const READ_BUF_SIZE: usize = 64;

/// Serial line to the detector board.
pub struct DetectorLine {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for DetectorLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorLine")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl DetectorLine {
    /// Open the detector serial port with 8N1 settings.
    ///
    /// # Errors
    ///
    /// Returns [`GeigerLogError::Serial`] if the port cannot be opened
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        debug!("Opening detector line at {} ({} baud)", path, baud_rate);

        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GeigerLogError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Detector line opened at {}", path);

        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Device path of the opened detector port.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Pump pulse events into the counter until the line closes.
    ///
    /// Runs as its own task for the life of the process; each received byte
    /// is one pulse.
    pub async fn run(self, handle: PulseHandle) -> Result<()> {
        pump(self.port, handle).await
    }
}

/// Count one pulse per byte read from `reader`.
///
/// Returns when the stream ends or errors; a dead detector line is a fault
/// for the surrounding system to handle, not something to retry here.
pub async fn pump<R>(mut reader: R, handle: PulseHandle) -> Result<()>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let read = reader
            .read(&mut buf)
            .await
            .map_err(|e| GeigerLogError::Serial(format!("detector read failed: {}", e)))?;

        if read == 0 {
            return Err(GeigerLogError::Serial("detector stream closed".to_string()));
        }

        for _ in 0..read {
            handle.count();
        }
        trace!("Detector burst: {} pulses", read);
    }
}
