//! Data conversion utilities for NMEA parsing
//!
//! Checksum computation and the unit conversions applied to raw sentence
//! fields. Every numeric conversion here is fail-soft: a field that does not
//! parse degrades to `0.0` instead of rejecting the whole sentence.

use std::str::FromStr;

/// Knots to meters per second
pub const KNOTS_TO_MPS: f64 = 0.514444;

/// Decimal places kept for latitude/longitude
pub const COORDINATE_PRECISION: usize = 8;

/// Decimal places kept for speed converted from knots
pub const SPEED_PRECISION: usize = 2;

/// XOR checksum of `value`, rendered as two uppercase hex digits
pub fn nmea_checksum(value: &str) -> String {
    let checksum = value.bytes().fold(0u8, |acc, byte| acc ^ byte);
    format!("{:02X}", checksum)
}

/// Parse `value`, falling back to `default` when it does not parse
pub fn parse_or<T: FromStr>(value: &str, default: T) -> T {
    value.parse().unwrap_or(default)
}

/// Round to `fixed` decimal places through decimal formatting
pub fn round_to(value: f64, fixed: usize) -> f64 {
    parse_or(&format!("{:.*}", fixed, value), 0.0)
}

/// Convert NMEA `[d]ddmm.mmmm` notation to signed decimal degrees
///
/// `int_digits` is the width of the whole-degree prefix (2 for latitude,
/// 3 for longitude). The result is rounded to `fixed` places and negated for
/// the `S` and `W` hemispheres. Empty or unparseable input yields `0.0`.
pub fn deg_to_dec(degrees: &str, cardinal: &str, int_digits: usize, fixed: usize) -> f64 {
    if degrees.is_empty() {
        return 0.0;
    }

    let (Some(whole), Some(minutes)) = (degrees.get(..int_digits), degrees.get(int_digits..))
    else {
        return 0.0;
    };

    let (Ok(whole), Ok(minutes)) = (whole.parse::<f64>(), minutes.parse::<f64>()) else {
        return 0.0;
    };

    let mut decimal = whole + minutes / 60.0;
    if cardinal == "S" || cardinal == "W" {
        decimal = -decimal;
    }

    round_to(decimal, fixed)
}

/// Convert a speed in knots to m/s, rounded to `fixed` places
pub fn to_speed(value: &str, fixed: usize) -> f64 {
    match value.parse::<f64>() {
        Ok(knots) => round_to(knots * KNOTS_TO_MPS, fixed),
        Err(_) => 0.0,
    }
}
