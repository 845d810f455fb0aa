//! # NMEA RMC Sentence Parser
//!
//! Extracts the minimal fix fields the logger needs (UTC time, validity,
//! latitude, longitude, date) from `RMC` sentences. Everything else the
//! receiver emits is ignored; this is not a general GPS protocol stack.

use crate::error::{GeigerLogError, Result};
use crate::gps::GpsFix;
use crate::record::checksum::{parse as parse_checksum, xor_checksum};

/// Minimum RMC field count: talker, time, status, lat, N/S, lon, E/W,
/// speed, course, date
const RMC_MIN_FIELDS: usize = 10;

/// Check whether a raw line looks like an RMC sentence.
///
/// Cheap pre-filter; [`parse_rmc`] still validates framing and checksum.
pub fn is_rmc(line: &str) -> bool {
    line.starts_with('$') && line.get(3..6) == Some("RMC")
}

/// Parse one RMC sentence into a raw fix.
///
/// # Arguments
///
/// * `line` - Complete sentence including `$`, `*` and the checksum digits
///
/// # Returns
///
/// * `Result<GpsFix>` - Raw fix fields. A `V` (void) status yields a fix
///   with `valid == false` rather than an error: no-lock is a normal
///   receiver state, and the synthesizer downstream decides its fate.
///
/// # Errors
///
/// Returns [`GeigerLogError::Gps`] if:
/// - Framing is broken (missing `$` or `*`)
/// - The checksum does not match the sentence body
/// - The sentence is not RMC or is missing fields
pub fn parse_rmc(line: &str) -> Result<GpsFix> {
    let line = line.trim_end();

    let body = line
        .strip_prefix('$')
        .ok_or_else(|| GeigerLogError::Gps("sentence missing leading '$'".to_string()))?;

    let (body, checksum_field) = body
        .split_once('*')
        .ok_or_else(|| GeigerLogError::Gps("sentence missing '*' delimiter".to_string()))?;

    // Verify checksum before trusting any field
    let received = parse_checksum(checksum_field).ok_or_else(|| {
        GeigerLogError::Gps(format!("malformed checksum field: {:?}", checksum_field))
    })?;
    let calculated = xor_checksum(body.as_bytes());
    if calculated != received {
        return Err(GeigerLogError::Gps(format!(
            "checksum mismatch: expected {:02X}, got {:02X}",
            calculated, received
        )));
    }

    let fields: Vec<&str> = body.split(',').collect();

    if !fields[0].ends_with("RMC") {
        return Err(GeigerLogError::Gps(format!(
            "not an RMC sentence: {}",
            fields[0]
        )));
    }

    if fields.len() < RMC_MIN_FIELDS {
        return Err(GeigerLogError::Gps(format!(
            "RMC sentence too short: {} fields",
            fields.len()
        )));
    }

    // Status 'A' = lock, 'V' = void. A void fix carries no trustworthy
    // position, so report it as invalid with zeroed fields.
    if fields[2] != "A" {
        return Ok(GpsFix {
            time: 0,
            date: 0,
            latitude: 0.0,
            longitude: 0.0,
            valid: false,
        });
    }

    let time = parse_hhmmss(fields[1])?;
    let latitude = parse_coordinate(fields[3], fields[4])?;
    let longitude = parse_coordinate(fields[5], fields[6])?;
    let date = fields[9]
        .parse::<u32>()
        .map_err(|_| GeigerLogError::Gps(format!("malformed date field: {:?}", fields[9])))?;

    Ok(GpsFix {
        time,
        date,
        latitude,
        longitude,
        valid: true,
    })
}

/// Parse the HHMMSS integer part of an RMC time field, dropping any
/// fractional seconds the receiver appends.
fn parse_hhmmss(field: &str) -> Result<u32> {
    let whole = field.split('.').next().unwrap_or("");
    whole
        .parse::<u32>()
        .map_err(|_| GeigerLogError::Gps(format!("malformed time field: {:?}", field)))
}

/// Convert an NMEA `(d)ddmm.mmmm` coordinate plus hemisphere into signed
/// decimal degrees.
fn parse_coordinate(value: &str, hemisphere: &str) -> Result<f64> {
    let raw = value
        .parse::<f64>()
        .map_err(|_| GeigerLogError::Gps(format!("malformed coordinate: {:?}", value)))?;

    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere {
        "N" | "E" => Ok(decimal),
        "S" | "W" => Ok(-decimal),
        other => Err(GeigerLogError::Gps(format!(
            "unknown hemisphere: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO_RMC: &str = "$GPRMC,235959,A,3539.4800,N,13942.0960,E,000.0,000.0,311299,,*1F";

    #[test]
    fn test_is_rmc_prefilter() {
        assert!(is_rmc(TOKYO_RMC));
        assert!(is_rmc("$GNRMC,,V,,,,,,,,,*00"));
        assert!(!is_rmc("$GPGGA,235959,3539.4800,N,13942.0960,E,1,08,0.9,30.0,M,,,,*20"));
        assert!(!is_rmc("garbage"));
        assert!(!is_rmc("$GP"));
    }

    #[test]
    fn test_parse_valid_rmc() {
        let fix = parse_rmc(TOKYO_RMC).unwrap();

        assert!(fix.valid);
        assert_eq!(fix.time, 235959);
        assert_eq!(fix.date, 311299);
        assert!((fix.latitude - 35.658).abs() < 0.0001);
        assert!((fix.longitude - 139.70160).abs() < 0.0001);
    }

    #[test]
    fn test_parse_rmc_with_fractional_seconds_and_west() {
        let line = "$GPRMC,120000.00,A,5057.9700,N,00146.1100,W,012.4,089.6,150624,,,A*41";
        let fix = parse_rmc(line).unwrap();

        assert!(fix.valid);
        assert_eq!(fix.time, 120000);
        assert_eq!(fix.date, 150624);
        assert!(fix.longitude < 0.0, "western longitude must be negative");
        assert!((fix.longitude - (-1.76850)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_southern_hemisphere() {
        let line = "$GPRMC,081836,A,3751.6500,S,14507.3600,E,000.0,360.0,130998,011.3,E*62";
        let fix = parse_rmc(line).unwrap();

        assert!((fix.latitude - (-37.86083)).abs() < 0.0001);
        assert!((fix.longitude - 145.12266).abs() < 0.0001);
    }

    #[test]
    fn test_void_status_yields_invalid_fix_not_error() {
        let line = "$GPRMC,120000,V,,,,,,,150624,,*36";
        let fix = parse_rmc(line).unwrap();

        assert!(!fix.valid);
        assert_eq!(fix.latitude, 0.0);
        assert_eq!(fix.longitude, 0.0);
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let corrupted = TOKYO_RMC.replace("*1F", "*1E");
        let result = parse_rmc(&corrupted);
        assert!(matches!(result, Err(GeigerLogError::Gps(_))));
    }

    #[test]
    fn test_non_rmc_sentence_rejected() {
        let line = "$GPGGA,235959,3539.4800,N,13942.0960,E,1,08,0.9,30.0,M,,,,*20";
        assert!(parse_rmc(line).is_err());
    }

    #[test]
    fn test_broken_framing_rejected() {
        assert!(parse_rmc("GPRMC,235959,A*00").is_err());
        assert!(parse_rmc("$GPRMC,235959,A").is_err());
        assert!(parse_rmc("$GPRMC,235959,A*Z9").is_err());
    }

    #[test]
    fn test_trailing_newline_tolerated() {
        let line = format!("{}\r\n", TOKYO_RMC);
        assert!(parse_rmc(&line).unwrap().valid);
    }
}
