//! Tokio mpsc channel sink implementation.

use crate::sink::Sink;
use crate::{Frame, LogLine, SinkError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// A sink that sends owned log lines to a tokio mpsc channel.
///
/// This is the way to hand log output to async code (uploaders, filters,
/// test assertions). Sending never blocks the pump: when the channel is
/// full the line is dropped and [`SinkError::ChannelFull`] is reported.
///
/// # Example
///
/// ```
/// use stream_log::{ChannelSink, LogLine};
/// use tokio::sync::mpsc;
///
/// let (tx, mut rx) = mpsc::channel::<LogLine>(100);
/// let sink = ChannelSink::new(tx);
///
/// // Use sink with StreamLog builder...
/// // Then receive lines:
/// // while let Some(line) = rx.recv().await { ... }
/// ```
pub struct ChannelSink {
    name: String,
    sender: mpsc::Sender<LogLine>,
}

impl ChannelSink {
    /// Creates a new channel sink with the given sender.
    ///
    /// Size the channel for the longest burst between two receives.
    pub fn new(sender: mpsc::Sender<LogLine>) -> Self {
        Self {
            name: "channel".to_string(),
            sender,
        }
    }

    /// Creates a new channel sink with a custom name.
    pub fn with_name(name: impl Into<String>, sender: mpsc::Sender<LogLine>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }
}

impl Sink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        self.sender.try_send(frame.to_line()).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::ChannelFull,
            TrySendError::Closed(_) => SinkError::ChannelClosed,
        })
    }
}
