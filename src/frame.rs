//! Borrowed view of one dispatched frame.

use std::borrow::Cow;

use crate::pipeline::LINE_TERMINATOR;
use crate::LogLine;

/// One unit of log output handed to a [`Sink`](crate::Sink).
///
/// A frame borrows the accumulator's assembly buffer: its payload (at most
/// `frame_capacity` bytes, usually one line including its `\n`) followed by
/// a single NUL byte. The buffer is reused as soon as the sink returns, so a
/// sink that needs the data later copies it with [`Frame::to_line()`].
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    sequence: u64,
}

impl<'a> Frame<'a> {
    /// `bytes` is the payload followed by exactly one NUL.
    pub(crate) fn new(bytes: &'a [u8], sequence: u64) -> Self {
        debug_assert_eq!(bytes.last(), Some(&0), "frame must be NUL-terminated");
        Self { bytes, sequence }
    }

    /// Payload plus the trailing NUL, for C-style consumers.
    pub fn as_bytes_with_nul(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload without the trailing NUL. Keeps the `\n` if the frame ends a line.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Length including the trailing NUL.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.len() <= 1
    }

    /// Position of this frame in the bridge's output, starting at 0.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns `true` if the payload ends with the line terminator.
    ///
    /// Only split frames carrying the head or middle of an overlong line
    /// return `false`.
    pub fn ends_line(&self) -> bool {
        self.payload().last() == Some(&LINE_TERMINATOR)
    }

    /// Payload with a trailing `\n` or `\r\n` removed.
    pub fn line(&self) -> &'a [u8] {
        let payload = self.payload();
        let payload = payload.strip_suffix(b"\n").unwrap_or(payload);
        payload.strip_suffix(b"\r").unwrap_or(payload)
    }

    /// [`Frame::line()`] as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.line())
    }

    /// Copies the payload into an owned [`LogLine`].
    pub fn to_line(&self) -> LogLine {
        LogLine::new(self.payload(), self.sequence)
    }
}
