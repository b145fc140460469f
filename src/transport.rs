//! Transport collaborator
//!
//! The connection engine only needs a byte stream it can read from on a
//! background thread and close from the caller's thread. [`Transport`] is that
//! seam; [`SerialConnector`] opens real serial ports through `serialport`.

use crate::Result;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Bidirectional byte stream to the receiver
pub trait Transport: Read + Write + Send {
    /// Independent handle to the same stream, used by the reader thread
    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>>;

    /// Release the handle
    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

/// Opens a [`Transport`] by port name and baud rate
pub trait Connector: Send + Sync {
    /// `read_timeout` bounds how long a single `read` may block. Returned
    /// transports must honour it: [`crate::Gps::disconnect`] waits for the
    /// reader's pending `read` to return.
    fn open(&self, port: &str, baud_rate: u32, read_timeout: Duration)
        -> Result<Box<dyn Transport>>;
}

impl Transport for Box<dyn SerialPort> {
    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>> {
        let port = self.try_clone().map_err(io::Error::from)?;
        Ok(Box::new(port))
    }
}

/// Serial port connector backed by the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Box<dyn Transport>> {
        let port = serialport::new(port, baud_rate)
            .timeout(read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .open()?;
        Ok(Box::new(port))
    }
}
