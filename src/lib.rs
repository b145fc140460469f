//! NMEA GPS Library
//!
//! A Rust library for reading a serial-attached GPS receiver that emits
//! NMEA-0183 sentences and keeping its most recent fix available for polling.
//!
//! # Features
//!
//! - **`cli`** (default): Build the `nmea-gps` command-line binary
//! - **`json`**: Render positions as JSON with [`Position::to_json`]
//! - **`serde`**: Enable serialization/deserialization of [`Position`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nmea_gps::{Gps, GpsOptions};
//!
//! let mut gps = Gps::new(GpsOptions::default());
//! gps.connect("/dev/ttyUSB0", 9600).unwrap();
//!
//! match gps.fetch_position() {
//!     Ok(position) => println!("{:.8}, {:.8}", position.latitude, position.longitude),
//!     Err(err) => eprintln!("{err}"),
//! }
//!
//! gps.disconnect().unwrap();
//! ```
//!
//! Sentences can also be parsed without a connection:
//! ```rust
//! use nmea_gps::{parse_sentence, FixState};
//!
//! let mut fix = FixState::new();
//! parse_sentence(&mut fix, "$GPVTG,269.49,T,,M,0.02,N,0.04,K,D*3E");
//! assert_eq!(fix.course, 269.49);
//! ```
//!
//! # Public API
//!
//! ## Connection
//! - [`Gps`] - Connect / disconnect a receiver and fetch its latest fix
//! - [`GpsOptions`] - Diagnostics and read-timeout settings
//! - [`Transport`], [`Connector`] - Byte stream seam, [`SerialConnector`] by default
//!
//! ## Parsing
//! - [`parse_sentence`] - Apply one NMEA line to a [`FixState`], dropping bad lines
//! - [`apply_sentence`] - Same, but reports why a line was dropped
//! - [`LineFramer`] - Reassemble lines from arbitrary byte chunks
//!
//! ## Conversion Utilities
//! - [`nmea_checksum`] - XOR checksum as two uppercase hex digits
//! - [`deg_to_dec`] - `ddmm.mmmm` to signed decimal degrees
//! - [`to_speed`] - Knots to meters per second
//! - [`parse_or`] - Fail-soft numeric parsing

pub mod config;
pub mod conversion;
pub mod error;
pub mod gps;
pub mod parser;
pub mod transport;
pub mod types;

pub use config::*;
pub use conversion::*;
pub use error::*;
pub use gps::*;
pub use parser::*;
pub use transport::*;
pub use types::*;
