use crate::types::Position;
use std::fmt;

/// Connection-lifecycle errors surfaced by [`crate::Gps`]
#[derive(Debug)]
pub enum GpsError {
    /// Transport read/write/close failure
    Io(std::io::Error),
    /// Transport could not be opened
    Serial(serialport::Error),
    /// No active connection; carries the last known snapshot
    Disconnected(Box<Position>),
    /// `connect` called while a session is still live
    AlreadyConnected,
}

impl GpsError {
    /// Last known position carried by a [`GpsError::Disconnected`] error
    pub fn last_known(&self) -> Option<&Position> {
        match self {
            GpsError::Disconnected(position) => Some(position),
            _ => None,
        }
    }
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsError::Io(err) => write!(f, "Transport I/O error: {}", err),
            GpsError::Serial(err) => write!(f, "Serial port error: {}", err),
            GpsError::Disconnected(_) => write!(f, "GPS is disconnected"),
            GpsError::AlreadyConnected => write!(f, "GPS is already connected"),
        }
    }
}

impl std::error::Error for GpsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpsError::Io(err) => Some(err),
            GpsError::Serial(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GpsError {
    fn from(err: std::io::Error) -> Self {
        GpsError::Io(err)
    }
}

impl From<serialport::Error> for GpsError {
    fn from(err: serialport::Error) -> Self {
        GpsError::Serial(err)
    }
}

pub type Result<T> = std::result::Result<T, GpsError>;

/// Reasons a sentence line is dropped by the parser.
///
/// These never leave the parsing layer through the connection API; they are
/// only reported by [`crate::parser::apply_sentence`] and in debug logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceError {
    /// No `*` separating payload and checksum
    MissingChecksum,
    /// Payload does not start with `$`
    MissingStart,
    /// Checksum supplied after `*` does not match the payload
    ChecksumMismatch { expected: String, found: String },
    /// Known sentence with fewer fields than its layout requires
    Truncated {
        sentence: String,
        fields: usize,
        required: usize,
    },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceError::MissingChecksum => write!(f, "Missing checksum"),
            SentenceError::MissingStart => write!(f, "Missing '$' start delimiter"),
            SentenceError::ChecksumMismatch { expected, found } => {
                write!(f, "Checksum mismatch: expected {}, found {}", expected, found)
            }
            SentenceError::Truncated {
                sentence,
                fields,
                required,
            } => write!(
                f,
                "Truncated {} sentence: {} fields, {} required",
                sentence, fields, required
            ),
        }
    }
}

impl std::error::Error for SentenceError {}
