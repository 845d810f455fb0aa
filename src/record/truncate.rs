//! # Locale Truncation Policies
//!
//! Some postal regimes require position coarsening before radiation data may
//! be mailed or uploaded. The policy is a closed set of variants selected by
//! configuration at startup; it rewrites the formatted record body BEFORE the
//! checksum is finalized, so the checksum always covers exactly the bytes on
//! the wire. Field order and checksum placement are preserved by every
//! variant.

use serde::Deserialize;

/// Record-body field index of latitude (header = 0)
const LATITUDE_FIELD: usize = 3;

/// Record-body field index of longitude
const LONGITUDE_FIELD: usize = 4;

/// Decimal places kept by the region-privacy policy (~100 m resolution)
const PRIVACY_DECIMALS: usize = 3;

/// Closed set of truncation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Records pass through untouched
    #[default]
    None,
    /// Latitude/longitude truncated to 3 decimal places for postal-privacy
    /// regimes
    RegionPrivacy,
}

impl TruncationPolicy {
    /// Apply this policy to a formatted record body (the bytes between `$`
    /// and `*`, before the checksum is computed).
    pub fn truncate(&self, body: &str) -> String {
        match self {
            TruncationPolicy::None => body.to_string(),
            TruncationPolicy::RegionPrivacy => {
                let fields: Vec<String> = body
                    .split(',')
                    .enumerate()
                    .map(|(index, field)| {
                        if index == LATITUDE_FIELD || index == LONGITUDE_FIELD {
                            truncate_decimals(field, PRIVACY_DECIMALS)
                        } else {
                            field.to_string()
                        }
                    })
                    .collect();
                fields.join(",")
            }
        }
    }
}

/// Cut a decimal field down to at most `places` fractional digits.
///
/// Truncation, not rounding: coarsening must never move a position toward a
/// neighboring cell.
fn truncate_decimals(field: &str, places: usize) -> String {
    match field.find('.') {
        Some(dot) => {
            let keep = (dot + 1 + places).min(field.len());
            field[..keep].to_string()
        }
        None => field.to_string(),
    }
}
