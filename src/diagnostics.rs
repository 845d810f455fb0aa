//! # Diagnostics Module
//!
//! Voltage-probe collaborator seam. The surrounding system may consult it to
//! annotate startup logs or trigger low-power behavior; the measurement
//! pipeline never depends on it for correctness.

use crate::error::Result;

/// Battery/supply voltage channels on the board
pub const CHANNEL_BATTERY: u8 = 0;
pub const CHANNEL_HV_SUPPLY: u8 = 1;

/// Reads a diagnostic voltage rail.
pub trait VoltageProbe {
    /// Read the voltage on the given channel, in volts.
    fn read_voltage(&self, channel: u8) -> Result<f32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeigerLogError;

    struct BenchProbe;

    impl VoltageProbe for BenchProbe {
        fn read_voltage(&self, channel: u8) -> Result<f32> {
            match channel {
                CHANNEL_BATTERY => Ok(3.7),
                CHANNEL_HV_SUPPLY => Ok(400.0),
                other => Err(GeigerLogError::Serial(format!(
                    "no such diagnostic channel: {}",
                    other
                ))),
            }
        }
    }

    #[test]
    fn test_probe_reads_known_channels() {
        let probe = BenchProbe;
        assert_eq!(probe.read_voltage(CHANNEL_BATTERY).unwrap(), 3.7);
        assert_eq!(probe.read_voltage(CHANNEL_HV_SUPPLY).unwrap(), 400.0);
        assert!(probe.read_voltage(9).is_err());
    }
}
