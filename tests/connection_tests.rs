//! Integration tests for the connection engine
//!
//! Drives `Gps` end to end over an in-memory loopback transport:
//! - Sentence sequences arriving in small fragmented reads
//! - Fail-soft handling of bad checksums and blank fields
//! - Read failures ending the session
//! - Repeated disconnects and reconnects

use nmea_gps::{nmea_checksum, Connector, Gps, GpsError, GpsOptions, Position, Transport};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Largest read the loopback hands out, so lines span several reads
const MAX_READ: usize = 5;

#[derive(Default)]
struct WireState {
    bytes: VecDeque<u8>,
    fail_reads: bool,
    fail_close: bool,
    close_delay: Duration,
    opens: usize,
    closes: usize,
}

#[derive(Default)]
struct Wire {
    state: Mutex<WireState>,
    ready: Condvar,
}

impl Wire {
    fn feed(&self, lines: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for line in lines {
            state.bytes.extend(line.as_bytes());
            state.bytes.extend(b"\r\n");
        }
        self.ready.notify_all();
    }

    fn unplug(&self) {
        self.state.lock().unwrap().fail_reads = true;
        self.ready.notify_all();
    }

    fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

struct LoopbackTransport {
    wire: Arc<Wire>,
}

impl Read for LoopbackTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let state = self.wire.state.lock().unwrap();
        let (mut state, _) = self
            .wire
            .ready
            .wait_timeout_while(state, Duration::from_millis(10), |s| {
                s.bytes.is_empty() && !s.fail_reads
            })
            .unwrap();

        if state.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        if state.bytes.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }

        let n = buf.len().min(MAX_READ).min(state.bytes.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.bytes.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for LoopbackTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.wire.state.lock().unwrap().bytes.extend(buf);
        self.wire.ready.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for LoopbackTransport {
    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>> {
        Ok(Box::new(LoopbackTransport {
            wire: Arc::clone(&self.wire),
        }))
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let delay = self.wire.state.lock().unwrap().close_delay;
        thread::sleep(delay);

        let mut state = self.wire.state.lock().unwrap();
        state.closes += 1;
        if state.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
        }
        Ok(())
    }
}

struct LoopbackConnector {
    wire: Arc<Wire>,
}

impl Connector for LoopbackConnector {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        _read_timeout: Duration,
    ) -> nmea_gps::Result<Box<dyn Transport>> {
        assert_eq!(port, "/dev/ttyUSB0");
        assert_eq!(baud_rate, 9600);

        let mut state = self.wire.state.lock().unwrap();
        state.opens += 1;
        state.fail_reads = false;
        Ok(Box::new(LoopbackTransport {
            wire: Arc::clone(&self.wire),
        }))
    }
}

fn connected_gps() -> (Gps, Arc<Wire>) {
    let wire = Arc::new(Wire::default());
    let options = GpsOptions {
        debug: true,
        ..GpsOptions::default()
    };
    let mut gps = Gps::with_connector(
        options,
        LoopbackConnector {
            wire: Arc::clone(&wire),
        },
    );
    gps.connect("/dev/ttyUSB0", 9600)
        .expect("loopback connect should succeed");
    (gps, wire)
}

/// Poll until `done` holds for the latest fix or two seconds pass
fn wait_for(gps: &Gps, done: impl Fn(&Position) -> bool) -> Position {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let position = gps.last_position();
        if done(&position) || Instant::now() > deadline {
            return position;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn wait_until_disconnected(gps: &Gps) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while gps.is_connected() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
}

/// The reader clears the connected flag before it closes the transport
fn wait_for_closes(wire: &Wire, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(2);
    while wire.closes() < expected && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    wire.closes()
}

fn sentence(body: &str) -> String {
    format!("${}*{}", body, nmea_checksum(body))
}

#[test]
fn test_full_fix_from_sentence_sequence() {
    let (mut gps, wire) = connected_gps();
    wire.feed(&[
        "$GPGGA,202530.00,5109.0262,N,11401.8407,W,5,40,0.5,1097.36,M,-17.00,M,18,TSTR*61",
        "$GPGSA,A,3,04,27,09,16,08,03,07,21,,,,,1.62,1.02,1.25*02",
        "$GPRMC,203522.00,A,5109.0262308,N,11401.8407342,W,0.004,133.4,130522,0.0,E,D*2B",
        "$GPVTG,269.49,T,,M,0.02,N,0.04,K,D*3E",
    ]);

    wait_for(&gps, |p| p.course == 269.49);
    let position = gps.fetch_position().expect("connected fetch should succeed");

    assert_eq!(position.latitude, 51.15043718);
    assert_eq!(position.longitude, -114.0306789);
    assert_eq!(position.altitude, 1097.36);
    assert_eq!(position.speed, 0.02);
    assert_eq!(position.course, 269.49);
    assert_eq!(position.time, 203522.0);
    assert_eq!(
        position.satellites,
        vec!["04", "27", "09", "16", "08", "03", "07", "21", "", "", "", ""]
    );
    assert_eq!(position.pdop, "1.62");
    assert_eq!(position.hdop, "1.02");
    assert_eq!(position.vdop, "1.25");

    assert!(gps.disconnect().is_ok());
}

#[test]
fn test_bad_checksums_keep_position_empty() {
    let (mut gps, wire) = connected_gps();
    wire.feed(&[
        "$GPGGA,161715.000,1858.3654,N,09334.2837,W,1,08,1.11,20.9,M,-8.8,M,,*5E",
        "$GPGSA,A,3,01,08,04,21,07,09,27,17,,,,,1.97,1.11,1.63*0B",
        "$GPRMC,161715.000,A,1858.3654,N,09334.2837,W,0.01,147.61,140421,,,A*75",
        "$GPVTG,147.61,T,,M,0.01,N,0.02,K,A*3B",
    ]);

    let position = wait_for(&gps, |p| p.course == 147.61);
    assert_eq!(position.course, 147.61);
    assert_eq!(position.latitude, 0.0);
    assert_eq!(position.longitude, 0.0);
    assert_eq!(position.altitude, 0.0);

    gps.disconnect().unwrap();
}

#[test]
fn test_blank_altitude_reads_as_zero() {
    let (mut gps, wire) = connected_gps();
    let gga = sentence("GPGGA,161715.000,1858.3654,N,09334.2837,W,1,08,1.11,,M,-8.8,M,,");
    wire.feed(&[&gga]);

    let position = wait_for(&gps, |p| p.latitude != 0.0);
    assert_eq!(position.latitude, 18.97275667);
    assert_eq!(position.longitude, -93.57139500);
    assert_eq!(position.altitude, 0.0);
    assert!(gps.fetch_position().is_ok());

    gps.disconnect().unwrap();
}

#[test]
fn test_lines_are_applied_in_arrival_order() {
    let (mut gps, wire) = connected_gps();
    let first = sentence("GPVTG,10.00,T,,M,1.00,N,1.85,K,A");
    let second = sentence("GPVTG,20.00,T,,M,2.00,N,3.70,K,A");
    let marker = sentence("GPGSA,A,3,01,,,,,,,,,,,,9.99,9.99,9.99");
    wire.feed(&[&first, "garbage without checksum", &second, &marker]);

    let position = wait_for(&gps, |p| p.pdop == "9.99");
    assert_eq!(position.course, 20.0);
    assert_eq!(position.speed, 2.0);

    gps.disconnect().unwrap();
}

#[test]
fn test_read_error_ends_session() {
    let (mut gps, wire) = connected_gps();
    wire.feed(&["$GPVTG,269.49,T,,M,0.02,N,0.04,K,D*3E"]);
    wait_for(&gps, |p| p.course == 269.49);

    wire.unplug();
    wait_until_disconnected(&gps);
    assert!(!gps.is_connected());
    assert_eq!(wait_for_closes(&wire, 1), 1);

    match gps.fetch_position() {
        Err(GpsError::Disconnected(last_known)) => {
            assert_eq!(last_known.course, 269.49);
            assert_eq!(last_known.speed, 0.02);
        }
        other => panic!("expected disconnected error, got {:?}", other),
    }

    // Session already torn down by the reader
    assert!(gps.disconnect().is_ok());
    assert_eq!(wire.closes(), 1);
}

#[test]
fn test_read_error_with_slow_close() {
    let (mut gps, wire) = connected_gps();
    wire.state.lock().unwrap().close_delay = Duration::from_millis(50);

    wire.unplug();
    wait_until_disconnected(&gps);
    assert!(!gps.is_connected());
    assert_eq!(wait_for_closes(&wire, 1), 1);

    assert!(gps.disconnect().is_ok());
    assert_eq!(wire.closes(), 1);
}

#[test]
fn test_disconnect_returns_within_read_timeout() {
    let (mut gps, _wire) = connected_gps();
    let started = Instant::now();
    gps.disconnect().unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "disconnect should not outlast a bounded read"
    );
}

#[test]
fn test_reconnect_after_read_error() {
    let (mut gps, wire) = connected_gps();
    wire.unplug();
    wait_until_disconnected(&gps);

    gps.connect("/dev/ttyUSB0", 9600).unwrap();
    assert!(gps.is_connected());
    assert_eq!(wire.state.lock().unwrap().opens, 2);

    wire.feed(&["$GPVTG,269.49,T,,M,0.02,N,0.04,K,D*3E"]);
    let position = wait_for(&gps, |p| p.course == 269.49);
    assert_eq!(position.course, 269.49);

    gps.disconnect().unwrap();
}

#[test]
fn test_connect_twice_is_rejected() {
    let (mut gps, wire) = connected_gps();
    assert!(matches!(
        gps.connect("/dev/ttyUSB0", 9600),
        Err(GpsError::AlreadyConnected)
    ));
    assert!(gps.is_connected());
    assert_eq!(wire.state.lock().unwrap().opens, 1);

    gps.disconnect().unwrap();
}

#[test]
fn test_disconnect_twice() {
    let (mut gps, wire) = connected_gps();
    assert!(gps.disconnect().is_ok());
    assert!(!gps.is_connected());
    assert!(gps.disconnect().is_ok());
    assert_eq!(wire.closes(), 1);

    let err = gps.fetch_position().unwrap_err();
    assert_eq!(err.to_string(), "GPS is disconnected");
    assert_eq!(err.last_known(), Some(&Position::default()));
}

#[test]
fn test_close_error_is_reported_once() {
    let (mut gps, wire) = connected_gps();
    wire.state.lock().unwrap().fail_close = true;

    assert!(matches!(gps.disconnect(), Err(GpsError::Io(_))));
    assert!(!gps.is_connected());
    assert!(gps.disconnect().is_ok());
}

#[test]
fn test_drop_closes_transport() {
    let (gps, wire) = connected_gps();
    drop(gps);
    assert_eq!(wire.closes(), 1);
}
