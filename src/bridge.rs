//! The log bridge: a producer half that never blocks and a pump half that
//! does all the slow work.
//!
//! ```text
//! LogProducer::submit ──► byte ring ──► LogPump::pump ──► LineAccumulator ──► sinks
//! ```
//!
//! [`LogBridge`] owns both halves for single-threaded hosts that call
//! [`submit`](LogBridge::submit) and [`pump`](LogBridge::pump) from one
//! place. [`LogBridge::split()`] hands them to separate contexts.

use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

use crate::event::EventEmitter;
use crate::pipeline::{LineAccumulator, RingConsumer, RingProducer};
use crate::registry::LogRegistry;
use crate::stats::StatsState;
use crate::{BridgeEvent, BridgeStats, StreamLogError};

/// A ring buffer and a line accumulator wired together.
///
/// Built with [`StreamLog::builder()`](crate::StreamLog::builder).
///
/// # Example
///
/// ```
/// use stream_log::{CallbackSink, StreamLog};
///
/// let mut bridge = StreamLog::builder()
///     .add_sink(CallbackSink::new(|frame| print!("{}", frame.text())))
///     .build()?;
///
/// bridge.submit(b"sensor ready\n");
/// assert_eq!(bridge.pump(), 13);
/// # Ok::<(), stream_log::StreamLogError>(())
/// ```
pub struct LogBridge {
    producer: LogProducer,
    pump: LogPump,
}

impl LogBridge {
    pub(crate) fn new(producer: LogProducer, pump: LogPump) -> Self {
        Self { producer, pump }
    }

    /// Queues bytes for delivery. Bytes that do not fit are dropped.
    pub fn submit(&mut self, bytes: &[u8]) {
        self.producer.submit(bytes);
    }

    /// Queues one byte and reports it as written.
    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.producer.write_byte(byte)
    }

    /// Drains the ring into the sinks. Returns the number of bytes drained.
    pub fn pump(&mut self) -> usize {
        self.pump.pump()
    }

    /// Current counters.
    pub fn stats(&self) -> BridgeStats {
        self.pump.stats()
    }

    /// Separates the producer half from the pump half.
    pub fn split(self) -> (LogProducer, LogPump) {
        (self.producer, self.pump)
    }

    /// Like [`split()`](Self::split), with the producer wrapped for use from
    /// many threads.
    pub fn into_shared(self) -> (SharedProducer, LogPump) {
        (self.producer.into_shared(), self.pump)
    }

    /// Registers the producer with a host log registry and returns the pump.
    ///
    /// The caller keeps pumping the returned half, usually on a timer.
    pub fn setup<R>(self, registry: &mut R) -> Result<LogPump, StreamLogError>
    where
        R: LogRegistry + ?Sized,
    {
        let (producer, pump) = self.into_shared();
        registry.add_sink(producer)?;
        Ok(pump)
    }
}

impl io::Write for LogBridge {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.producer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write half of a bridge.
///
/// Never blocks, allocates or fails. When the ring is full the newest bytes
/// are dropped and counted; the pump reports them later as
/// [`BridgeEvent::BytesDropped`].
pub struct LogProducer {
    ring: RingProducer,
    stats: Arc<StatsState>,
}

impl LogProducer {
    pub(crate) fn new(ring: RingProducer, stats: Arc<StatsState>) -> Self {
        Self { ring, stats }
    }

    /// Queues as much of `bytes` as fits.
    pub fn submit(&mut self, bytes: &[u8]) {
        let accepted = self.ring.push_slice(bytes);
        StatsState::add(&self.stats.bytes_submitted, bytes.len());
        StatsState::add(&self.stats.bytes_dropped, bytes.len() - accepted);
    }

    /// Queues one byte. Always returns 1, even if the byte was dropped.
    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.submit(&[byte]);
        1
    }

    /// Bytes that can be queued before the ring is full.
    pub fn free_len(&self) -> usize {
        self.ring.free_len()
    }

    /// Wraps this producer for shared use.
    pub fn into_shared(self) -> SharedProducer {
        SharedProducer(Arc::new(Mutex::new(self)))
    }
}

impl io::Write for LogProducer {
    /// Always reports the whole buffer as written; overflow is dropped.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read half of a bridge.
///
/// Owns the line accumulator and the sinks. All sink I/O, events and
/// internal logging happen inside [`pump()`](Self::pump).
pub struct LogPump {
    ring: RingConsumer,
    accumulator: LineAccumulator,
    stats: Arc<StatsState>,
    events: EventEmitter,
    reported_drops: u64,
}

impl LogPump {
    pub(crate) fn new(
        ring: RingConsumer,
        accumulator: LineAccumulator,
        stats: Arc<StatsState>,
        events: EventEmitter,
    ) -> Self {
        Self {
            ring,
            accumulator,
            stats,
            events,
            reported_drops: 0,
        }
    }

    /// Drains the bytes queued when the call starts through the accumulator.
    ///
    /// Bytes pushed while the pump runs, including by a sink that logs, wait
    /// for the next call. A partial line stays staged for the next call.
    /// Returns the number of bytes drained.
    pub fn pump(&mut self) -> usize {
        let pending = self.ring.len();
        let mut drained = 0;
        while drained < pending {
            let Some(byte) = self.ring.try_pop() else {
                break;
            };
            self.accumulator.feed(byte);
            drained += 1;
        }
        StatsState::add(&self.stats.bytes_pumped, drained);

        self.report_drops();
        drained
    }

    fn report_drops(&mut self) {
        let dropped = self.stats.bytes_dropped.load(Ordering::Relaxed);
        if dropped > self.reported_drops {
            let delta = dropped - self.reported_drops;
            self.reported_drops = dropped;
            tracing::warn!(dropped_bytes = delta, "log ring full, bytes dropped");
            self.events.emit(BridgeEvent::BytesDropped {
                dropped_bytes: delta,
            });
        }
    }

    /// Bytes waiting in the ring.
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Bytes of the current partial line.
    pub fn staged(&self) -> &[u8] {
        self.accumulator.staged()
    }

    /// Returns `true` while an overlong line is being dropped.
    pub fn is_discarding(&self) -> bool {
        self.accumulator.is_discarding()
    }

    /// Current counters.
    pub fn stats(&self) -> BridgeStats {
        self.stats.snapshot()
    }

    pub(crate) fn stats_state(&self) -> Arc<StatsState> {
        Arc::clone(&self.stats)
    }

    /// Pumps one last time and calls every sink's `on_stop`.
    ///
    /// A staged partial line is not delivered.
    pub fn stop(&mut self) {
        self.pump();
        self.accumulator.dispatcher().stop_sinks();
    }
}

/// A [`LogProducer`] behind a mutex, cloneable across threads.
///
/// The mutex is the serialization point for multiple writers; it is held
/// only while bytes are copied into the ring. Implements
/// [`MakeWriter`] so it can back a `tracing_subscriber::fmt` layer, where
/// each event is written under one lock and lines never interleave.
#[derive(Clone)]
pub struct SharedProducer(Arc<Mutex<LogProducer>>);

impl SharedProducer {
    /// Queues as much of `bytes` as fits.
    pub fn submit(&self, bytes: &[u8]) {
        self.0.lock().submit(bytes);
    }

    /// Locks the producer for a sequence of writes.
    pub fn lock(&self) -> ProducerWriter<'_> {
        ProducerWriter(self.0.lock())
    }
}

impl io::Write for SharedProducer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedProducer {
    type Writer = ProducerWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.lock()
    }
}

/// Exclusive access to a [`SharedProducer`].
pub struct ProducerWriter<'a>(MutexGuard<'a, LogProducer>);

impl io::Write for ProducerWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
