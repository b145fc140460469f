use std::time::Duration;

/// Options for a [`crate::Gps`] connection
#[derive(Debug, Clone)]
pub struct GpsOptions {
    /// Emit diagnostics through the `log` facade
    pub debug: bool,
    /// Upper bound on a single transport read; also how often the reader
    /// notices a disconnect request
    pub read_timeout: Duration,
}

impl Default for GpsOptions {
    fn default() -> Self {
        Self {
            debug: false,
            read_timeout: Duration::from_millis(100),
        }
    }
}
