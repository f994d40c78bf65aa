//! Owned log line with metadata.

use std::borrow::Cow;
use std::sync::Arc;

/// An owned copy of one frame's payload.
///
/// [`Frame`](crate::Frame) borrows a buffer that is reused right after the
/// sink returns. Sinks that hand data to another task, such as
/// [`ChannelSink`](crate::ChannelSink), copy it into a `LogLine` first.
///
/// Bytes are stored in an `Arc<[u8]>` so clones are cheap.
///
/// # Example
///
/// ```
/// use stream_log::LogLine;
///
/// let line = LogLine::new(b"boot complete\n", 0);
/// assert_eq!(line.text(), "boot complete");
///
/// let line2 = line.clone(); // Cheap clone - shares the bytes
/// assert_eq!(line2.len(), 14);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Payload bytes, including the terminating `\n` when the frame ended a line.
    pub bytes: Arc<[u8]>,

    /// Sequence number of the frame this line was copied from.
    pub sequence: u64,
}

impl LogLine {
    /// Creates a line by copying `bytes`.
    pub fn new(bytes: &[u8], sequence: u64) -> Self {
        Self {
            bytes: Arc::from(bytes),
            sequence,
        }
    }

    /// Returns the number of payload bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the line carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns `true` if the payload ends with `\n`.
    pub fn is_complete(&self) -> bool {
        self.bytes.last() == Some(&b'\n')
    }

    /// The line as text without its terminator, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        let bytes = &*self.bytes;
        let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        String::from_utf8_lossy(bytes)
    }
}
