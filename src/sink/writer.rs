//! Sink over any `io::Write`.

use std::io::{self, Write};

use parking_lot::Mutex;

use crate::sink::Sink;
use crate::{Frame, SinkError};

/// A sink that writes each frame's payload to an `io::Write`.
///
/// The payload is written as-is, so lines keep their `\n` and split
/// fragments join back together in the output. The trailing NUL is not
/// written.
///
/// # Example
///
/// ```
/// use stream_log::WriterSink;
///
/// let sink = WriterSink::stderr();
/// let buffered = WriterSink::new("memory", Box::new(Vec::<u8>::new()));
/// ```
pub struct WriterSink {
    name: String,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterSink {
    /// Creates a sink writing to `writer`.
    pub fn new(name: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new("stdout", Box::new(io::stdout()))
    }

    /// Sink writing to the process's standard error.
    pub fn stderr() -> Self {
        Self::new("stderr", Box::new(io::stderr()))
    }
}

impl Sink for WriterSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        let mut writer = self.writer.lock();
        writer
            .write_all(frame.payload())
            .and_then(|()| writer.flush())
            .map_err(|e| SinkError::write_failed(e.to_string()))
    }

    fn on_stop(&self) -> Result<(), SinkError> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| SinkError::write_failed(e.to_string()))
    }
}
