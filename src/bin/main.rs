//! CLI binary for the NMEA GPS library
//!
//! Connects to a receiver and prints the latest fix as JSON at a fixed
//! interval until the receiver disconnects or the requested count is reached.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, Command};
use nmea_gps::{Gps, GpsError, GpsOptions};
use std::thread;
use std::time::Duration;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("VERGEN_GIT_COMMIT_DATE"),
    ")"
);

fn main() -> Result<()> {
    let matches = Command::new("NMEA GPS")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(LONG_VERSION)
        .about("Read NMEA-0183 sentences from a serial GPS receiver and print the current fix.")
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .help("Serial port the receiver is attached to (e.g. /dev/ttyUSB0, COM3)")
                .required(true)
                .value_name("PORT"),
        )
        .arg(
            Arg::new("baud")
                .long("baud")
                .short('b')
                .help("Baud rate")
                .default_value("9600")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Milliseconds between position polls")
                .default_value("1000")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('n')
                .help("Stop after this many polls (default: run until disconnected)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output for the serial link and dropped sentences")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    let port = matches
        .get_one::<String>("port")
        .context("missing --port")?
        .clone();
    let baud = *matches.get_one::<u32>("baud").unwrap_or(&9600);
    let interval = Duration::from_millis(*matches.get_one::<u64>("interval-ms").unwrap_or(&1000));
    let count = matches.get_one::<u64>("count").copied();

    env_logger::Builder::new()
        .filter_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let options = GpsOptions {
        debug,
        ..GpsOptions::default()
    };
    let mut gps = Gps::new(options);
    gps.connect(&port, baud)
        .with_context(|| format!("Failed to open GPS on {port} @ {baud} baud"))?;

    if debug {
        println!("Connected to {port} @ {baud} baud");
    }

    let mut polls = 0u64;
    loop {
        thread::sleep(interval);

        match gps.fetch_position() {
            Ok(position) => println!("{}", position.to_json()?),
            Err(GpsError::Disconnected(last_known)) => {
                eprintln!("Error: GPS disconnected");
                eprintln!("Last known position: {}", last_known.to_json()?);
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        }

        polls += 1;
        if count.is_some_and(|limit| polls >= limit) {
            break;
        }
    }

    gps.disconnect()
        .with_context(|| format!("Failed to close GPS on {port}"))?;
    Ok(())
}
