//! Fixed-column field parser for TLE lines
//!
//! Nothing here returns an error. A field that is missing, too short, or not
//! numeric comes back as `None` and the other fields are still read.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use tle_common::OrbitalElements;

/// Line 2 must reach the end of the mean motion column
pub const MIN_LINE2_LEN: usize = 63;

// 0-based column ranges on line 2
const INCLINATION: Range<usize> = 8..16;
const RAAN: Range<usize> = 17..25;
const ECCENTRICITY: Range<usize> = 26..33;
const ARG_PERIGEE: Range<usize> = 34..42;
const MEAN_ANOMALY: Range<usize> = 43..51;
const MEAN_MOTION: Range<usize> = 52..63;
const REVOLUTION: Range<usize> = 63..68;

// 0-based column ranges on line 1
const EPOCH_YEAR: Range<usize> = 18..20;
const EPOCH_DAY: Range<usize> = 20..32;

static NORAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1\s*(\d{5})").expect("NORAD pattern is valid"));

/// NORAD catalog number from line 1 (`1 NNNNNU ...`).
pub fn parse_norad_id(line1: &str) -> Option<u32> {
    let line1 = line1.trim();
    if line1.is_empty() {
        return None;
    }

    NORAD_PATTERN
        .captures(line1)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Inclination (deg) and mean motion (rev/day) from line 2.
///
/// Both are `None` when the line is shorter than [`MIN_LINE2_LEN`].
pub fn parse_line2(line2: &str) -> (Option<f64>, Option<f64>) {
    if line2.len() < MIN_LINE2_LEN {
        return (None, None);
    }
    (column_f64(line2, INCLINATION), column_f64(line2, MEAN_MOTION))
}

/// Parse all three core fields of a record
pub fn parse_elements(line1: &str, line2: &str) -> OrbitalElements {
    let (inclination_deg, mean_motion_rev_per_day) = parse_line2(line2);
    OrbitalElements {
        norad_id: parse_norad_id(line1),
        inclination_deg,
        mean_motion_rev_per_day,
    }
}

/// Line 2 fields beyond inclination and mean motion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line2Extras {
    pub raan_deg: Option<f64>,
    pub eccentricity: Option<f64>,
    pub arg_perigee_deg: Option<f64>,
    pub mean_anomaly_deg: Option<f64>,
    pub revolution_number: Option<u32>,
}

/// Read RAAN, eccentricity, argument of perigee, mean anomaly and revolution
/// number. Same length precondition as [`parse_line2`].
pub fn parse_line2_extras(line2: &str) -> Line2Extras {
    if line2.len() < MIN_LINE2_LEN {
        return Line2Extras::default();
    }

    Line2Extras {
        raan_deg: column_f64(line2, RAAN),
        eccentricity: column(line2, ECCENTRICITY).and_then(parse_implied_decimal),
        arg_perigee_deg: column_f64(line2, ARG_PERIGEE),
        mean_anomaly_deg: column_f64(line2, MEAN_ANOMALY),
        revolution_number: column(line2, REVOLUTION.start..REVOLUTION.end.min(line2.len()))
            .and_then(|s| s.parse().ok()),
    }
}

/// Element set epoch from line 1 columns 19-32 (two-digit year + day of year).
///
/// Years 57-99 map to 19xx, 00-56 to 20xx.
pub fn parse_epoch(line1: &str) -> Option<DateTime<Utc>> {
    let yy: i32 = column(line1, EPOCH_YEAR)?.parse().ok()?;
    let day_of_year = column_f64(line1, EPOCH_DAY)?;
    if !(1.0..367.0).contains(&day_of_year) {
        return None;
    }

    let year = if yy >= 57 { 1900 + yy } else { 2000 + yy };
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc();
    let offset_ms = ((day_of_year - 1.0) * 86_400_000.0).round() as i64;

    start.checked_add_signed(Duration::milliseconds(offset_ms))
}

/// Trimmed, non-empty text of a column range
fn column(line: &str, range: Range<usize>) -> Option<&str> {
    line.get(range)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn column_f64(line: &str, range: Range<usize>) -> Option<f64> {
    column(line, range)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// TLE eccentricity is written without its leading "0."
fn parse_implied_decimal(digits: &str) -> Option<f64> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    format!("0.{}", digits).parse().ok()
}
