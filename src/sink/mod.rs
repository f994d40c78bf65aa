//! Sink trait and implementations for log destinations.
//!
//! A [`Sink`] is any destination that can receive log frames. The crate
//! provides these built-in sinks:
//!
//! - [`CallbackSink`]: Calls a closure with every frame
//! - [`ChannelSink`]: Sends owned lines to a tokio mpsc channel
//! - [`FileSink`]: Appends lines to a file
//! - [`SyslogUdpSink`]: Sends RFC 5424 syslog packets over UDP
//! - [`WriterSink`]: Writes lines to any `io::Write` (stdout, stderr, ...)
//!
//! You can implement the [`Sink`] trait for custom destinations.

mod callback;
mod channel;
mod file;
mod syslog;
mod writer;

pub use callback::CallbackSink;
pub use channel::ChannelSink;
pub use file::FileSink;
pub use syslog::SyslogUdpSink;
pub use writer::WriterSink;

use crate::{Frame, SinkError};

/// A destination for log frames.
///
/// Sinks are called synchronously from the pump, one frame at a time, in
/// output order. They run on the consumer side only, so they may block on
/// I/O; the producer is never affected.
///
/// # Implementation Notes
///
/// - Methods take `&self` - use interior mutability (`Mutex`) if needed
/// - `write` must not keep the frame past its return; copy with
///   [`Frame::to_line()`] if the data is needed later
/// - Errors are reported as [`BridgeEvent::SinkError`] and the frame is not
///   retried; reconnect logic belongs inside the sink
/// - `on_start` runs when the bridge is built; an error there is fatal
/// - `on_stop` runs when a [`Session`] stops
///
/// [`BridgeEvent::SinkError`]: crate::BridgeEvent::SinkError
/// [`Session`]: crate::Session
///
/// # Example
///
/// ```
/// use stream_log::{Frame, Sink, SinkError};
///
/// struct PrintSink;
///
/// impl Sink for PrintSink {
///     fn name(&self) -> &str {
///         "print"
///     }
///
///     fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
///         println!("{}", frame.text());
///         Ok(())
///     }
/// }
/// ```
pub trait Sink: Send + Sync {
    /// Human-readable name for events and diagnostics.
    fn name(&self) -> &str;

    /// Called once when the bridge is built, before any frame flows.
    ///
    /// Default implementation does nothing.
    fn on_start(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Delivers one frame.
    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError>;

    /// Called during graceful shutdown to flush and release resources.
    ///
    /// Default implementation does nothing.
    fn on_stop(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
