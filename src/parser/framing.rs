//! Byte stream to line framing
//!
//! Serial reads arrive in arbitrary chunks. [`LineFramer`] accumulates them
//! and emits one line per `\n`, with a trailing `\r` removed. A `\r` inside
//! the line is kept, so a corrupted sentence still fails its checksum.

/// Longest line kept before the buffer is discarded
pub const MAX_LINE_LENGTH: usize = 1024;

/// Reassembles `\r\n`-terminated lines from arbitrary byte chunks
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
    overflowed: bool,
    discarded: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes`, returning every line they complete in arrival order
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.overflowed {
                    self.discarded += 1;
                } else if let Some(line) = self.take_line() {
                    lines.push(line);
                }
                self.buf.clear();
                self.overflowed = false;
            } else if self.buf.len() >= MAX_LINE_LENGTH {
                self.overflowed = true;
            } else {
                self.buf.push(byte);
            }
        }

        lines
    }

    /// Number of overlong lines thrown away so far
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Bytes buffered for the line in progress
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn take_line(&self) -> Option<String> {
        let line = self.buf.strip_suffix(b"\r").unwrap_or(&self.buf[..]);
        if line.is_empty() {
            return None;
        }

        Some(String::from_utf8_lossy(line).into_owned())
    }
}
