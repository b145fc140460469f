use crate::types::Position;

/// Number of satellite PRN slots carried by a GSA sentence
pub const GSA_SATELLITE_SLOTS: usize = 12;

/// Mutable fix record updated sentence by sentence
///
/// Each sentence type overwrites only the fields it carries, so the record
/// is the union of the latest value of every field seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixState {
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

impl FixState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy of the current fields
    pub fn snapshot(&self) -> Position {
        Position {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            course: self.course,
            speed: self.speed,
            time: self.time,
            satellites: self.satellites.clone(),
            pdop: self.pdop.clone(),
            hdop: self.hdop.clone(),
            vdop: self.vdop.clone(),
        }
    }
}
