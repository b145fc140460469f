//! GPS connection engine
//!
//! [`Gps`] owns the transport for one session at a time. A background reader
//! thread frames the byte stream into lines and feeds them, in order, to the
//! sentence parser. The fix record sits behind a mutex and callers only ever
//! see full copies of it.

use crate::config::GpsOptions;
use crate::error::{GpsError, Result};
use crate::parser::{apply_sentence, LineFramer};
use crate::transport::{Connector, SerialConnector, Transport};
use crate::types::{FixState, Position};
use log::{debug, warn};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

const READ_CHUNK_SIZE: usize = 256;

/// Stop signal shared by a session and its reader thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn same_session(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Default)]
struct Link {
    transport: Option<Box<dyn Transport>>,
    cancel: Option<CancelToken>,
}

struct Shared {
    connected: AtomicBool,
    fix: Mutex<FixState>,
    link: Mutex<Link>,
    debug: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    /// Tear down the live session.
    ///
    /// With `session` set, only that session is torn down; a reader whose
    /// session already ended must not close a newer one.
    fn teardown(&self, session: Option<&CancelToken>) -> Result<()> {
        let mut link = lock(&self.link);

        if let Some(session) = session {
            let current = link
                .cancel
                .as_ref()
                .is_some_and(|token| token.same_session(session));
            if !current {
                return Ok(());
            }
        }

        if self.connected.swap(false, Ordering::SeqCst) && self.debug {
            debug!("GPS disconnected");
        }

        if let Some(token) = link.cancel.take() {
            if !token.is_cancelled() {
                token.cancel();
            }
        }

        if let Some(transport) = link.transport.take() {
            if let Err(err) = transport.close() {
                if self.debug {
                    warn!("GPS transport close failed: {}", err);
                }
                return Err(GpsError::Io(err));
            }
        }

        Ok(())
    }
}

/// NMEA-0183 receiver connection with a continuously updated fix
pub struct Gps {
    options: GpsOptions,
    connector: Box<dyn Connector>,
    shared: Arc<Shared>,
    reader: Option<JoinHandle<()>>,
}

impl Gps {
    /// Receiver on a serial port
    pub fn new(options: GpsOptions) -> Self {
        Self::with_connector(options, SerialConnector)
    }

    /// Receiver on a custom transport
    pub fn with_connector<C: Connector + 'static>(options: GpsOptions, connector: C) -> Self {
        let shared = Arc::new(Shared {
            connected: AtomicBool::new(false),
            fix: Mutex::new(FixState::new()),
            link: Mutex::new(Link::default()),
            debug: options.debug,
        });

        Self {
            options,
            connector: Box::new(connector),
            shared,
            reader: None,
        }
    }

    /// Open `port` at `baud_rate` and start the background reader
    pub fn connect(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        if self.is_connected() {
            return Err(GpsError::AlreadyConnected);
        }
        // Reader of a session that ended on a read error
        self.join_reader();

        let transport = self
            .connector
            .open(port, baud_rate, self.options.read_timeout)
            .map_err(|err| {
                if self.options.debug {
                    warn!("GPS open {} @ {} failed: {}", port, baud_rate, err);
                }
                err
            })?;

        let reader_transport = match transport.try_clone_transport() {
            Ok(handle) => handle,
            Err(err) => {
                let _ = transport.close();
                return Err(GpsError::Io(err));
            }
        };

        let session = CancelToken::new();
        {
            let mut link = lock(&self.shared.link);
            link.transport = Some(transport);
            link.cancel = Some(session.clone());
            self.shared.connected.store(true, Ordering::SeqCst);
        }

        let shared = Arc::clone(&self.shared);
        let reader_session = session.clone();
        let spawned = thread::Builder::new()
            .name("nmea-reader".to_string())
            .spawn(move || read_loop(shared, reader_transport, reader_session));

        match spawned {
            Ok(handle) => {
                self.reader = Some(handle);
                if self.options.debug {
                    debug!("GPS connected on {} @ {}", port, baud_rate);
                }
                Ok(())
            }
            Err(err) => {
                let _ = self.shared.teardown(Some(&session));
                Err(GpsError::Io(err))
            }
        }
    }

    /// Close the session. Safe to call repeatedly.
    ///
    /// Only an error closing the transport handle is reported. Blocks until
    /// the reader thread exits, at most one transport read timeout.
    pub fn disconnect(&mut self) -> Result<()> {
        let result = self.shared.teardown(None);
        self.join_reader();
        result
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Copy of the current fix.
    ///
    /// When disconnected this fails with [`GpsError::Disconnected`], which
    /// still carries the last known fix.
    pub fn fetch_position(&self) -> Result<Position> {
        let position = self.last_position();
        if !self.is_connected() {
            return Err(GpsError::Disconnected(Box::new(position)));
        }
        Ok(position)
    }

    /// Copy of the last known fix regardless of connection state
    pub fn last_position(&self) -> Position {
        lock(&self.shared.fix).snapshot()
    }

    fn join_reader(&mut self) {
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() && self.options.debug {
                warn!("GPS reader thread panicked");
            }
        }
    }
}

impl Drop for Gps {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

fn read_loop(shared: Arc<Shared>, mut transport: Box<dyn Transport>, session: CancelToken) {
    let mut framer = LineFramer::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut discarded = 0;

    while !session.is_cancelled() {
        let n = match transport.read(&mut chunk) {
            Ok(n) if n > 0 => n,
            Err(err) if is_transient(err.kind()) => continue,
            failed => {
                if shared.debug {
                    match failed {
                        Err(err) => warn!("GPS read failed: {}", err),
                        Ok(_) => warn!("GPS transport reached end of stream"),
                    }
                }
                let _ = shared.teardown(Some(&session));
                break;
            }
        };

        for line in framer.extend(&chunk[..n]) {
            let outcome = apply_sentence(&mut lock(&shared.fix), &line);
            if shared.debug {
                if let Err(err) = outcome {
                    debug!("Dropped sentence {:?}: {}", line, err);
                }
            }
        }

        if framer.discarded() != discarded {
            discarded = framer.discarded();
            if shared.debug {
                debug!("Discarded overlong line ({} so far)", discarded);
            }
        }
    }
}
