//! Counters shared between the producer and the pump.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a bridge's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Bytes offered by the producer.
    pub bytes_submitted: u64,
    /// Bytes the producer could not queue because the ring was full.
    pub bytes_dropped: u64,
    /// Bytes drained from the ring by the pump.
    pub bytes_pumped: u64,
    /// Frames handed to the sinks.
    pub frames_dispatched: u64,
    /// Overlong lines dropped under the discard policy.
    pub lines_discarded: u64,
    /// Bytes belonging to discarded lines.
    pub bytes_discarded: u64,
    /// Failed sink writes.
    pub sink_errors: u64,
}

/// Atomic backing store for [`BridgeStats`].
///
/// Producer-side counters are plain relaxed increments; they never wait.
#[derive(Debug, Default)]
pub(crate) struct StatsState {
    pub bytes_submitted: AtomicU64,
    pub bytes_dropped: AtomicU64,
    pub bytes_pumped: AtomicU64,
    pub frames_dispatched: AtomicU64,
    pub lines_discarded: AtomicU64,
    pub bytes_discarded: AtomicU64,
    pub sink_errors: AtomicU64,
}

impl StatsState {
    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        if n > 0 {
            counter.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            bytes_submitted: self.bytes_submitted.load(Ordering::Relaxed),
            bytes_dropped: self.bytes_dropped.load(Ordering::Relaxed),
            bytes_pumped: self.bytes_pumped.load(Ordering::Relaxed),
            frames_dispatched: self.frames_dispatched.load(Ordering::Relaxed),
            lines_discarded: self.lines_discarded.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}
