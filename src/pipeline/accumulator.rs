//! Line assembly and the overlong-line policy.

use std::io::{self, Write};
use std::sync::Arc;

use crate::config::OverlongPolicy;
use crate::event::EventEmitter;
use crate::pipeline::Dispatcher;
use crate::stats::StatsState;
use crate::{BridgeEvent, Frame};

/// Byte that ends a log line.
pub(crate) const LINE_TERMINATOR: u8 = b'\n';

/// Secondary stream that receives every assembled byte verbatim.
pub type Mirror = Box<dyn Write + Send>;

/// Collects pumped bytes into frames of at most `capacity` bytes.
///
/// A frame completes when a `\n` is appended or the assembly buffer fills.
/// What happens next depends on the [`OverlongPolicy`]:
///
/// - `Split`: every completed frame is dispatched.
/// - `Discard`: a frame that filled up without ending its line starts a
///   discard run. That frame and every following one are dropped until the
///   line's `\n` arrives; the next line is delivered normally.
///
/// The mirror, when set, sees every completed frame before the policy runs.
pub struct LineAccumulator {
    // `capacity` payload bytes plus the NUL slot
    buf: Box<[u8]>,
    capacity: usize,
    offset: usize,
    awaiting_line_start: bool,
    discarded: usize,
    policy: OverlongPolicy,
    mirror: Option<Mirror>,
    dispatcher: Dispatcher,
    sequence: u64,
    stats: Arc<StatsState>,
    events: EventEmitter,
}

impl LineAccumulator {
    pub(crate) fn new(
        capacity: usize,
        policy: OverlongPolicy,
        mirror: Option<Mirror>,
        dispatcher: Dispatcher,
        stats: Arc<StatsState>,
        events: EventEmitter,
    ) -> Self {
        Self {
            buf: vec![0u8; capacity + 1].into_boxed_slice(),
            capacity,
            offset: 0,
            awaiting_line_start: false,
            discarded: 0,
            policy,
            mirror,
            dispatcher,
            sequence: 0,
            stats,
            events,
        }
    }

    /// Appends one byte, flushing when a line or the buffer is complete.
    pub fn feed(&mut self, byte: u8) {
        self.buf[self.offset] = byte;
        self.offset += 1;

        if self.offset >= self.capacity || byte == LINE_TERMINATOR {
            self.flush();
        }
    }

    /// Bytes of the current partial line waiting for more input.
    pub fn staged(&self) -> &[u8] {
        &self.buf[..self.offset]
    }

    /// Returns `true` while the tail of an overlong line is being dropped.
    pub fn is_discarding(&self) -> bool {
        self.awaiting_line_start
    }

    /// Largest payload of one frame.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn flush(&mut self) {
        let len = std::mem::take(&mut self.offset);
        let ends_line = self.buf[len - 1] == LINE_TERMINATOR;

        if let Some(mirror) = self.mirror.as_mut() {
            if let Err(e) = write_mirror(mirror.as_mut(), &self.buf[..len]) {
                self.events.emit(BridgeEvent::MirrorError {
                    error: e.to_string(),
                });
            }
        }

        if !self.policy.splits() {
            if self.awaiting_line_start {
                self.discarded += len;
                if ends_line {
                    self.finish_discard();
                }
                return;
            }
            if !ends_line {
                self.awaiting_line_start = true;
                self.discarded = len;
                return;
            }
        }

        self.buf[len] = 0;
        let frame = Frame::new(&self.buf[..=len], self.sequence);
        self.sequence += 1;
        self.dispatcher.dispatch(&frame);
    }

    fn finish_discard(&mut self) {
        let dropped = std::mem::take(&mut self.discarded);
        self.awaiting_line_start = false;

        StatsState::add(&self.stats.lines_discarded, 1);
        StatsState::add(&self.stats.bytes_discarded, dropped);
        tracing::debug!(dropped_bytes = dropped, "overlong line discarded");
        self.events.emit(BridgeEvent::LineDiscarded {
            dropped_bytes: dropped as u64,
        });
    }
}

fn write_mirror(mirror: &mut (dyn Write + Send), bytes: &[u8]) -> io::Result<()> {
    mirror.write_all(bytes)?;
    mirror.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dispatch::tests::RecordingSink;
    use crate::{event_callback, Sink};
    use parking_lot::Mutex;

    const M: usize = 16;

    struct Harness {
        acc: LineAccumulator,
        sink: Arc<RecordingSink>,
        stats: Arc<StatsState>,
        events: Arc<Mutex<Vec<BridgeEvent>>>,
    }

    impl Harness {
        fn new(policy: OverlongPolicy) -> Self {
            Self::with_mirror(policy, None)
        }

        fn with_mirror(policy: OverlongPolicy, mirror: Option<Mirror>) -> Self {
            let sink = Arc::new(RecordingSink::default());
            let stats = Arc::new(StatsState::default());
            let events = Arc::new(Mutex::new(Vec::new()));
            let events_clone = Arc::clone(&events);
            let emitter =
                EventEmitter::new(Some(event_callback(move |e| events_clone.lock().push(e))));
            let sinks: Vec<Arc<dyn Sink>> = vec![sink.clone()];
            let dispatcher = Dispatcher::new(sinks, emitter.clone(), Arc::clone(&stats));
            let acc = LineAccumulator::new(
                M,
                policy,
                mirror,
                dispatcher,
                Arc::clone(&stats),
                emitter,
            );
            Self {
                acc,
                sink,
                stats,
                events,
            }
        }

        fn feed(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.acc.feed(b);
            }
        }
    }

    /// Shared buffer usable as a mirror.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenMirror;

    impl Write for BrokenMirror {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "mirror gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_single_line_keeps_terminator_and_appends_nul() {
        for policy in [OverlongPolicy::Discard, OverlongPolicy::Split] {
            let mut h = Harness::new(policy);
            h.feed(b"abc\n");
            assert_eq!(h.sink.payloads(), vec![b"abc\n\0".to_vec()]);
        }
    }

    #[test]
    fn test_partial_line_stays_staged() {
        let mut h = Harness::new(OverlongPolicy::Discard);
        h.feed(b"par");
        assert!(h.sink.payloads().is_empty());
        assert_eq!(h.acc.staged(), b"par");

        h.feed(b"t\n");
        assert_eq!(h.sink.payloads(), vec![b"part\n\0".to_vec()]);
        assert!(h.acc.staged().is_empty());
    }

    #[test]
    fn test_discard_drops_overlong_line_and_recovers() {
        let mut h = Harness::new(OverlongPolicy::Discard);
        let long = vec![b'x'; M + 5];

        h.feed(&long);
        assert!(h.sink.payloads().is_empty());
        assert!(h.acc.is_discarding());

        h.feed(b"\n");
        assert!(h.sink.payloads().is_empty());
        assert!(!h.acc.is_discarding());

        h.feed(b"next\n");
        assert_eq!(h.sink.payloads(), vec![b"next\n\0".to_vec()]);

        let stats = h.stats.snapshot();
        assert_eq!(stats.lines_discarded, 1);
        assert_eq!(stats.bytes_discarded, (M + 6) as u64);
        assert_eq!(
            h.events.lock().as_slice(),
            &[BridgeEvent::LineDiscarded {
                dropped_bytes: (M + 6) as u64
            }]
        );
    }

    #[test]
    fn test_discard_spanning_many_frames() {
        let mut h = Harness::new(OverlongPolicy::Discard);
        let mut input = vec![b'y'; M * 3 + 2];
        input.push(b'\n');
        h.feed(&input);
        h.feed(b"ok\n");

        assert_eq!(h.sink.payloads(), vec![b"ok\n\0".to_vec()]);
        assert_eq!(h.stats.snapshot().bytes_discarded, input.len() as u64);
    }

    #[test]
    fn test_split_delivers_every_fragment() {
        let mut h = Harness::new(OverlongPolicy::Split);
        let long: Vec<u8> = (0..M + 5).map(|i| b'a' + (i % 26) as u8).collect();

        h.feed(&long);
        h.feed(b"\n");

        let frames = h.sink.payloads();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.len() - 1 <= M));

        let joined: Vec<u8> = frames
            .iter()
            .flat_map(|f| f[..f.len() - 1].iter().copied())
            .collect();
        let mut expected = long.clone();
        expected.push(b'\n');
        assert_eq!(joined, expected);
        assert_eq!(h.stats.snapshot().lines_discarded, 0);
    }

    #[test]
    fn test_blank_lines_are_not_coalesced() {
        let mut h = Harness::new(OverlongPolicy::Discard);
        h.feed(b"\n\n");
        assert_eq!(h.sink.payloads(), vec![b"\n\0".to_vec(), b"\n\0".to_vec()]);
    }

    #[test]
    fn test_line_of_exactly_capacity_is_one_frame() {
        for policy in [OverlongPolicy::Discard, OverlongPolicy::Split] {
            let mut h = Harness::new(policy);
            assert_eq!(h.acc.capacity(), M);
            let mut line = vec![b'z'; h.acc.capacity() - 1];
            line.push(b'\n');

            h.feed(&line);

            let mut expected = line.clone();
            expected.push(0);
            assert_eq!(h.sink.payloads(), vec![expected]);
            assert!(!h.acc.is_discarding());
        }
    }

    #[test]
    fn test_terminator_one_past_capacity_discards_line() {
        // The M-th byte decides: it is not `\n`, so the whole line goes
        let mut h = Harness::new(OverlongPolicy::Discard);
        let mut line = vec![b'z'; M];
        line.push(b'\n');

        h.feed(&line);
        h.feed(b"after\n");

        assert_eq!(h.sink.payloads(), vec![b"after\n\0".to_vec()]);
        assert_eq!(h.stats.snapshot().bytes_discarded, (M + 1) as u64);
    }

    #[test]
    fn test_terminator_one_past_capacity_splits_into_bare_newline() {
        let mut h = Harness::new(OverlongPolicy::Split);
        let mut line = vec![b'z'; M];
        line.push(b'\n');

        h.feed(&line);

        let frames = h.sink.payloads();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), M + 1);
        assert_eq!(frames[1], b"\n\0".to_vec());
    }

    #[test]
    fn test_mirror_receives_discarded_bytes() {
        let mirror = SharedBuf::default();
        let mut h = Harness::with_mirror(OverlongPolicy::Discard, Some(Box::new(mirror.clone())));

        let mut long = vec![b'q'; M + 5];
        long.push(b'\n');
        h.feed(&long);
        h.feed(b"kept\n");

        let mut expected = long.clone();
        expected.extend_from_slice(b"kept\n");
        assert_eq!(*mirror.0.lock(), expected);
        assert_eq!(h.sink.payloads(), vec![b"kept\n\0".to_vec()]);
    }

    #[test]
    fn test_mirror_failure_is_reported_and_delivery_continues() {
        let mut h = Harness::with_mirror(OverlongPolicy::Discard, Some(Box::new(BrokenMirror)));
        h.feed(b"still here\n");

        assert_eq!(h.sink.payloads(), vec![b"still here\n\0".to_vec()]);
        assert!(matches!(
            h.events.lock().first(),
            Some(BridgeEvent::MirrorError { .. })
        ));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut h = Harness::new(OverlongPolicy::Discard);
        h.feed(b"a\nb\nc\n");

        assert_eq!(h.stats.snapshot().frames_dispatched, 3);
        assert_eq!(h.acc.sequence, 3);
    }
}
