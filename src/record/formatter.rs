//! # Record Formatter
//!
//! Assembles one log record into its wire representation.
//!
//! The formatter is deterministic: the same inputs always produce
//! byte-identical output, and the emitted checksum always validates against
//! the emitted body (self-consistency invariant). When a truncation policy
//! is configured it rewrites the body first and the checksum covers the
//! truncated form, so consumers verify records without knowing the policy.

use bytes::{BufMut, Bytes, BytesMut};

use super::checksum::{render, xor_checksum};
use super::truncate::TruncationPolicy;
use super::{LogRecord, COORDINATE_PRECISION, RECORD_HEADER};

/// Capacity covering any record this formatter can emit; sized once so
/// steady-state formatting never reallocates mid-assembly.
const RECORD_CAPACITY: usize = 128;

/// Serializes log records into `$BGRDD` sentences.
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    truncation: TruncationPolicy,
}

impl RecordFormatter {
    /// Create a formatter with the configured truncation policy.
    pub fn new(truncation: TruncationPolicy) -> Self {
        Self { truncation }
    }

    /// Format one record as a self-delimited line.
    ///
    /// # Arguments
    ///
    /// * `record` - The assembled record for this reporting tick
    ///
    /// # Returns
    ///
    /// * `Bytes` - `$BGRDD,...*HH\r\n`, ready for the sink
    ///
    /// # Examples
    ///
    /// ```
    /// use geiger_logger::gps::{GpsFix, timestamp::synthesize};
    /// use geiger_logger::identity::{DeviceIdentity, RadioAddress};
    /// use geiger_logger::record::{LogRecord, ModeFlag};
    /// use geiger_logger::record::formatter::RecordFormatter;
    /// use geiger_logger::record::truncate::TruncationPolicy;
    ///
    /// let fix = GpsFix { time: 235959, date: 311299, latitude: 35.658, longitude: 139.7016, valid: true };
    /// let identity = DeviceIdentity { device_id: "45AB".into(), radio_address: RadioAddress::Address(0xBEEF) };
    /// let record = LogRecord {
    ///     timestamp: synthesize(&fix).unwrap(),
    ///     fix,
    ///     cpm: 12,
    ///     identity: &identity,
    ///     mode: ModeFlag::Normal,
    /// };
    ///
    /// let line = RecordFormatter::new(TruncationPolicy::None).format(&record);
    /// assert!(line.starts_with(b"$BGRDD,45AB,1999-12-31T23:59:59Z,"));
    /// ```
    pub fn format(&self, record: &LogRecord<'_>) -> Bytes {
        let body = format!(
            "{},{},{},{:.prec$},{:.prec$},{},{},{}",
            RECORD_HEADER,
            record.identity.device_id,
            record.timestamp,
            record.fix.latitude,
            record.fix.longitude,
            record.cpm,
            record.identity.radio_address,
            record.mode.as_char(),
            prec = COORDINATE_PRECISION,
        );

        // Truncate-then-checksum: the checksum must cover the wire bytes
        let body = self.truncation.truncate(&body);
        let checksum = xor_checksum(body.as_bytes());

        let mut line = BytesMut::with_capacity(RECORD_CAPACITY);
        line.put_u8(b'$');
        line.put_slice(body.as_bytes());
        line.put_u8(b'*');
        line.put_slice(render(checksum).as_bytes());
        line.put_slice(b"\r\n");

        line.freeze()
    }
}

/// Verify a formatted record against its own checksum field.
///
/// # Returns
///
/// * `bool` - true when framing is intact and the recomputed XOR over the
///   body matches the two checksum digits
pub fn verify(record: &[u8]) -> bool {
    let text = match std::str::from_utf8(record) {
        Ok(text) => text.trim_end(),
        Err(_) => return false,
    };

    let body = match text.strip_prefix('$') {
        Some(body) => body,
        None => return false,
    };

    match body.split_once('*') {
        Some((body, field)) => {
            super::checksum::parse(field) == Some(xor_checksum(body.as_bytes()))
        }
        None => false,
    }
}
