//! # Log Record Module
//!
//! The unit of output: one checksum-protected log line per reporting tick.
//!
//! This module handles:
//! - The record wire format (`$BGRDD` sentence) and its field order
//! - XOR checksum computation and rendering
//! - Locale truncation policies applied before the checksum is finalized
//!
//! Wire format (fixed contract):
//!
//! ```text
//! $BGRDD,<device_id>,<timestamp>,<lat>,<lon>,<cpm>,<radio>,<flag>*HH\r\n
//! ```
//!
//! `<radio>` is four uppercase hex digits (`0000` = no radio sentinel),
//! `<flag>` is the single mode-flag character, and `HH` is the XOR checksum
//! of every byte between `$` and `*` as two uppercase hex digits.

pub mod checksum;
pub mod formatter;
pub mod truncate;

use crate::error::{GeigerLogError, Result};
use crate::gps::timestamp::Timestamp;
use crate::gps::GpsFix;
use crate::identity::DeviceIdentity;

/// Record sentence header (without the `$`)
pub const RECORD_HEADER: &str = "BGRDD";

/// Decimal places for latitude/longitude in an untruncated record
pub const COORDINATE_PRECISION: usize = 5;

/// Operating-mode flag carried in each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlag {
    /// Normal survey operation
    Normal,
    /// Bench/test operation; consumers exclude these records from maps
    Test,
}

impl ModeFlag {
    /// Single-character wire rendering
    pub fn as_char(&self) -> char {
        match self {
            ModeFlag::Normal => 'A',
            ModeFlag::Test => 'T',
        }
    }
}

impl std::str::FromStr for ModeFlag {
    type Err = GeigerLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(ModeFlag::Normal),
            "test" => Ok(ModeFlag::Test),
            other => Err(GeigerLogError::ConfigurationMissing(format!(
                "unknown mode flag: {:?} (expected \"normal\" or \"test\")",
                other
            ))),
        }
    }
}

/// One log record, assembled per reporting tick and serialized immediately.
///
/// Borrows the process-lifetime identity; everything else is this cycle's
/// measurement. Never retained after the write.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub timestamp: Timestamp,
    pub fix: GpsFix,
    pub cpm: u32,
    pub identity: &'a DeviceIdentity,
    pub mode: ModeFlag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flag_wire_characters() {
        assert_eq!(ModeFlag::Normal.as_char(), 'A');
        assert_eq!(ModeFlag::Test.as_char(), 'T');
    }

    #[test]
    fn test_mode_flag_from_config_string() {
        assert_eq!("normal".parse::<ModeFlag>().unwrap(), ModeFlag::Normal);
        assert_eq!("test".parse::<ModeFlag>().unwrap(), ModeFlag::Test);
        assert!("survey".parse::<ModeFlag>().is_err());
    }
}
