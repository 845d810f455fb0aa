//! # Timestamp Synthesis
//!
//! Converts raw GPS time/date integers into a canonical UTC timestamp.
//!
//! A dose record with an untrustworthy timestamp is unusable for downstream
//! mapping and archival, so synthesis rejects bad input instead of guessing:
//! an unlocked receiver or a calendar-invalid field fails with
//! [`GeigerLogError::InvalidFix`] and the reporting cycle aborts.

use chrono::NaiveDate;

use crate::error::{GeigerLogError, Result};
use crate::gps::GpsFix;

/// Two-digit GPS years at or below this value expand into the 2000s;
/// above it, into the 1900s.
const CENTURY_PIVOT: u32 = 79;

/// Canonical UTC timestamp: always a valid calendar instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl std::fmt::Display for Timestamp {
    /// Fixed textual layout used in the log record: `YYYY-MM-DDTHH:MM:SSZ`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Synthesize a canonical timestamp from a raw GPS fix.
///
/// # Arguments
///
/// * `fix` - Raw fix carrying `time` as HHMMSS and `date` as DDMMYY integers
///
/// # Returns
///
/// * `Result<Timestamp>` - UTC timestamp with a four-digit year
///
/// # Errors
///
/// Returns [`GeigerLogError::InvalidFix`] if:
/// - The receiver reports no lock (`fix.valid == false`)
/// - Month, day (per month, leap-year aware), hour, minute, or second is
///   outside its calendar-valid range
///
/// # Examples
///
/// ```
/// use geiger_logger::gps::{GpsFix, timestamp::synthesize};
///
/// let fix = GpsFix { time: 235959, date: 311299, latitude: 35.66, longitude: 139.70, valid: true };
/// let ts = synthesize(&fix).unwrap();
/// assert_eq!(ts.to_string(), "1999-12-31T23:59:59Z");
/// ```
pub fn synthesize(fix: &GpsFix) -> Result<Timestamp> {
    if !fix.valid {
        return Err(GeigerLogError::InvalidFix(
            "receiver reports no lock".to_string(),
        ));
    }

    let hour = fix.time / 10_000;
    let minute = (fix.time / 100) % 100;
    let second = fix.time % 100;

    let day = fix.date / 10_000;
    let month = (fix.date / 100) % 100;
    let two_digit_year = fix.date % 100;

    let year = if two_digit_year <= CENTURY_PIVOT {
        2000 + two_digit_year
    } else {
        1900 + two_digit_year
    };

    if hour > 23 || minute > 59 || second > 59 {
        return Err(GeigerLogError::InvalidFix(format!(
            "time field out of range: {:06}",
            fix.time
        )));
    }

    // Month range and day-per-month validity, including leap-year February
    if NaiveDate::from_ymd_opt(year as i32, month, day).is_none() {
        return Err(GeigerLogError::InvalidFix(format!(
            "date field out of range: {:06}",
            fix.date
        )));
    }

    Ok(Timestamp {
        year: year as u16,
        month: month as u8,
        day: day as u8,
        hour: hour as u8,
        minute: minute as u8,
        second: second as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(time: u32, date: u32, valid: bool) -> GpsFix {
        GpsFix {
            time,
            date,
            latitude: 35.6580,
            longitude: 139.7016,
            valid,
        }
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let result = synthesize(&fix(120000, 150623, false));
        assert!(matches!(result, Err(GeigerLogError::InvalidFix(_))));
    }

    #[test]
    fn test_century_pivot_expands_low_years_to_2000s() {
        let ts = synthesize(&fix(0, 10100, true)).unwrap();
        assert_eq!(ts.year, 2000);

        let ts = synthesize(&fix(0, 10179, true)).unwrap();
        assert_eq!(ts.year, 2079);
    }

    #[test]
    fn test_century_pivot_expands_high_years_to_1900s() {
        let ts = synthesize(&fix(0, 10180, true)).unwrap();
        assert_eq!(ts.year, 1980);

        let ts = synthesize(&fix(235959, 311299, true)).unwrap();
        assert_eq!(ts.year, 1999);
        assert_eq!(ts.to_string(), "1999-12-31T23:59:59Z");
    }

    #[test]
    fn test_display_layout_is_fixed_width() {
        let ts = synthesize(&fix(90305, 10203, true)).unwrap();
        assert_eq!(ts.to_string(), "2003-02-01T09:03:05Z");
    }

    #[test]
    fn test_hour_out_of_range_rejected() {
        let result = synthesize(&fix(240000, 150623, true));
        assert!(matches!(result, Err(GeigerLogError::InvalidFix(_))));
    }

    #[test]
    fn test_minute_and_second_out_of_range_rejected() {
        assert!(synthesize(&fix(126000, 150623, true)).is_err());
        assert!(synthesize(&fix(120060, 150623, true)).is_err());
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        let result = synthesize(&fix(120000, 151323, true));
        assert!(matches!(result, Err(GeigerLogError::InvalidFix(_))));

        assert!(synthesize(&fix(120000, 150023, true)).is_err());
    }

    #[test]
    fn test_day_validity_per_month() {
        // 31 April does not exist
        assert!(synthesize(&fix(120000, 310423, true)).is_err());
        // 31 March does
        assert!(synthesize(&fix(120000, 310323, true)).is_ok());
        // Day zero never does
        assert!(synthesize(&fix(120000, 423, true)).is_err());
    }

    #[test]
    fn test_leap_year_february() {
        // 2024 is a leap year, 2023 is not
        assert!(synthesize(&fix(120000, 290224, true)).is_ok());
        assert!(synthesize(&fix(120000, 290223, true)).is_err());

        // 2000 is a leap year (divisible by 400)
        assert!(synthesize(&fix(120000, 290200, true)).is_ok());
    }

    #[test]
    fn test_midnight_boundary() {
        let ts = synthesize(&fix(0, 10124, true)).unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00Z");
    }
}
