//! Byte ring buffer between the log producer and the pump.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Write half of the byte ring.
///
/// Exactly one context owns this half. Every operation is wait-free: no
/// locks, no allocation, no I/O. When the ring is full the byte is refused
/// and the bytes already queued are left untouched.
pub struct RingProducer {
    inner: HeapProd<u8>,
}

impl RingProducer {
    /// Queues one byte. Returns `false` if the ring is full.
    #[inline]
    pub fn try_push(&mut self, byte: u8) -> bool {
        self.inner.try_push(byte).is_ok()
    }

    /// Queues as many leading bytes of `bytes` as fit and returns that count.
    #[inline]
    pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
        self.inner.push_slice(bytes)
    }

    /// Total number of bytes the ring can hold.
    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }

    /// Bytes that can be queued right now.
    pub fn free_len(&self) -> usize {
        self.inner.vacant_len()
    }
}

/// Read half of the byte ring, owned by the pump.
pub struct RingConsumer {
    inner: HeapCons<u8>,
}

impl RingConsumer {
    /// Takes the oldest queued byte, or `None` if the ring is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<u8> {
        self.inner.try_pop()
    }

    /// Number of bytes waiting to be pumped.
    pub fn len(&self) -> usize {
        self.inner.occupied_len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of bytes the ring can hold.
    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }
}

/// Creates a byte ring holding `capacity` bytes.
///
/// Returns the producer half (for the logging side) and the consumer half
/// (for the pump). `capacity` must be non-zero.
pub fn byte_ring(capacity: usize) -> (RingProducer, RingConsumer) {
    let ring = HeapRb::<u8>::new(capacity);
    let (producer, consumer) = ring.split();
    (
        RingProducer { inner: producer },
        RingConsumer { inner: consumer },
    )
}
