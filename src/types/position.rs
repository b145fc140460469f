#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the receiver fix
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub course: f64,
    pub speed: f64,
    pub time: f64,
    pub satellites: Vec<String>,
    pub pdop: String,
    pub hdop: String,
    pub vdop: String,
}

#[cfg(feature = "json")]
impl Position {
    /// Render as a JSON object using the exchange field names
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
