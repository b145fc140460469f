//! NMEA sentence parsing
//!
//! Verifies the checksum of one framed line, then extracts the fields of the
//! GGA, GSA, RMC and VTG sentences into a [`FixState`]. Any other sentence is
//! ignored. Numeric fields that fail to parse become `0.0`.

use crate::conversion::{
    deg_to_dec, nmea_checksum, parse_or, to_speed, COORDINATE_PRECISION, SPEED_PRECISION,
};
use crate::error::SentenceError;
use crate::types::{FixState, GSA_SATELLITE_SLOTS};

/// Sentence formatters understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    /// Time, position and fix data
    Gga,
    /// Active satellites and dilution of precision
    Gsa,
    /// Recommended minimum navigation data
    Rmc,
    /// Track made good and ground speed
    Vtg,
}

impl SentenceKind {
    /// Resolve an address field such as `$GPGGA` or `$GNRMC`
    ///
    /// The two-character talker is not checked; dispatch is on the formatter.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let address = identifier.strip_prefix('$')?;
        if address.len() != 5 || !address.is_ascii() {
            return None;
        }

        match &address[2..] {
            "GGA" => Some(SentenceKind::Gga),
            "GSA" => Some(SentenceKind::Gsa),
            "RMC" => Some(SentenceKind::Rmc),
            "VTG" => Some(SentenceKind::Vtg),
            _ => None,
        }
    }

    /// Minimum field count (identifier included) the extraction reads
    pub fn required_fields(self) -> usize {
        match self {
            SentenceKind::Gga => 10,
            SentenceKind::Gsa => 18,
            SentenceKind::Rmc => 9,
            SentenceKind::Vtg => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SentenceKind::Gga => "GGA",
            SentenceKind::Gsa => "GSA",
            SentenceKind::Rmc => "RMC",
            SentenceKind::Vtg => "VTG",
        }
    }
}

/// Parse one line into `fix`, silently dropping anything malformed
pub fn parse_sentence(fix: &mut FixState, line: &str) {
    let _ = apply_sentence(fix, line);
}

/// Parse one line into `fix`, reporting why a line was dropped
///
/// Returns `Ok(None)` for well-formed sentences of an unsupported type. On
/// error `fix` is left untouched.
pub fn apply_sentence(
    fix: &mut FixState,
    line: &str,
) -> Result<Option<SentenceKind>, SentenceError> {
    let mut parts = line.split('*');
    let payload = parts.next().unwrap_or_default();
    let checksum = parts.next().ok_or(SentenceError::MissingChecksum)?;

    let body = payload
        .strip_prefix('$')
        .ok_or(SentenceError::MissingStart)?;
    let expected = nmea_checksum(body);
    if checksum != expected {
        return Err(SentenceError::ChecksumMismatch {
            expected,
            found: checksum.to_string(),
        });
    }

    let fields: Vec<&str> = payload.split(',').collect();
    let Some(kind) = SentenceKind::from_identifier(fields[0]) else {
        return Ok(None);
    };

    if fields.len() < kind.required_fields() {
        return Err(SentenceError::Truncated {
            sentence: kind.name().to_string(),
            fields: fields.len(),
            required: kind.required_fields(),
        });
    }

    match kind {
        SentenceKind::Gga => {
            fix.time = parse_or(fields[1], 0.0);
            fix.latitude = deg_to_dec(fields[2], fields[3], 2, COORDINATE_PRECISION);
            fix.longitude = deg_to_dec(fields[4], fields[5], 3, COORDINATE_PRECISION);
            fix.altitude = parse_or(fields[9], 0.0);
        }
        SentenceKind::Gsa => {
            fix.satellites = fields[3..3 + GSA_SATELLITE_SLOTS]
                .iter()
                .map(|prn| prn.to_string())
                .collect();
            fix.pdop = fields[15].to_string();
            fix.hdop = fields[16].to_string();
            fix.vdop = fields[17].to_string();
        }
        SentenceKind::Rmc => {
            fix.time = parse_or(fields[1], 0.0);
            fix.latitude = deg_to_dec(fields[3], fields[4], 2, COORDINATE_PRECISION);
            fix.longitude = deg_to_dec(fields[5], fields[6], 3, COORDINATE_PRECISION);
            fix.speed = to_speed(fields[7], SPEED_PRECISION);
            fix.course = parse_or(fields[8], 0.0);
        }
        SentenceKind::Vtg => {
            // VTG speed is taken as-is, no knots conversion
            fix.course = parse_or(fields[1], 0.0);
            fix.speed = parse_or(fields[5], 0.0);
        }
    }

    Ok(Some(kind))
}
