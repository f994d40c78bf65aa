//! Fan-out of finished frames to every sink.

use std::sync::Arc;

use crate::event::EventEmitter;
use crate::sink::Sink;
use crate::stats::StatsState;
use crate::{BridgeEvent, Frame, StreamLogError};

/// Delivers each frame to all sinks in registration order.
///
/// A failing sink does not stop delivery to the others. There is no retry:
/// the error is counted, logged and surfaced as [`BridgeEvent::SinkError`].
pub struct Dispatcher {
    sinks: Vec<Arc<dyn Sink>>,
    events: EventEmitter,
    stats: Arc<StatsState>,
}

impl Dispatcher {
    pub(crate) fn new(
        sinks: Vec<Arc<dyn Sink>>,
        events: EventEmitter,
        stats: Arc<StatsState>,
    ) -> Self {
        Self {
            sinks,
            events,
            stats,
        }
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Writes a frame to all sinks.
    pub fn dispatch(&self, frame: &Frame<'_>) {
        StatsState::add(&self.stats.frames_dispatched, 1);

        for sink in &self.sinks {
            if let Err(e) = sink.write(frame) {
                StatsState::add(&self.stats.sink_errors, 1);
                tracing::warn!(
                    sink = sink.name(),
                    sequence = frame.sequence(),
                    error = %e,
                    "sink write failed"
                );
                self.events.emit(BridgeEvent::SinkError {
                    sink_name: sink.name().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Starts all sinks.
    ///
    /// Returns an error if any sink fails to start.
    pub fn start_sinks(&self) -> Result<(), StreamLogError> {
        for sink in &self.sinks {
            sink.on_start()
                .map_err(|e| StreamLogError::SinkStartFailed {
                    sink_name: sink.name().to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Stops all sinks, reporting failures as events.
    pub fn stop_sinks(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.on_stop() {
                self.events.emit(BridgeEvent::SinkError {
                    sink_name: sink.name().to_string(),
                    error: format!("Error during shutdown: {e}"),
                });
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{event_callback, SinkError};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Records every frame payload it receives.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) frames: Mutex<Vec<Vec<u8>>>,
        pub(crate) stopped: AtomicBool,
    }

    impl RecordingSink {
        pub(crate) fn payloads(&self) -> Vec<Vec<u8>> {
            self.frames.lock().clone()
        }
    }

    impl Sink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
            self.frames.lock().push(frame.as_bytes_with_nul().to_vec());
            Ok(())
        }

        fn on_stop(&self) -> Result<(), SinkError> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink {
        attempts: AtomicUsize,
        fail_start: bool,
    }

    impl FailingSink {
        fn new() -> Self {
            Self {
                attempts: AtomicUsize::new(0),
                fail_start: false,
            }
        }
    }

    impl Sink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_start(&self) -> Result<(), SinkError> {
            if self.fail_start {
                return Err(SinkError::custom("cannot open"));
            }
            Ok(())
        }

        fn write(&self, _frame: &Frame<'_>) -> Result<(), SinkError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(SinkError::custom("intentional failure"))
        }
    }

    fn dispatcher(sinks: Vec<Arc<dyn Sink>>) -> (Dispatcher, Arc<StatsState>) {
        let stats = Arc::new(StatsState::default());
        (
            Dispatcher::new(sinks, EventEmitter::default(), Arc::clone(&stats)),
            stats,
        )
    }

    #[test]
    fn test_dispatch_writes_to_all_sinks() {
        let sink1 = Arc::new(RecordingSink::default());
        let sink2 = Arc::new(RecordingSink::default());
        let (dispatcher, stats) = dispatcher(vec![sink1.clone(), sink2.clone()]);
        assert_eq!(dispatcher.sink_count(), 2);

        dispatcher.dispatch(&Frame::new(b"abc\n\0", 0));

        assert_eq!(sink1.payloads(), vec![b"abc\n\0".to_vec()]);
        assert_eq!(sink2.payloads(), vec![b"abc\n\0".to_vec()]);
        assert_eq!(stats.snapshot().frames_dispatched, 1);
    }

    #[test]
    fn test_failing_sink_does_not_block_others_and_is_not_retried() {
        let failing = Arc::new(FailingSink::new());
        let recording = Arc::new(RecordingSink::default());
        let stats = Arc::new(StatsState::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);

        let dispatcher = Dispatcher::new(
            vec![failing.clone(), recording.clone()],
            EventEmitter::new(Some(event_callback(move |e| events_clone.lock().push(e)))),
            Arc::clone(&stats),
        );

        dispatcher.dispatch(&Frame::new(b"x\n\0", 0));

        assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(recording.payloads().len(), 1);
        assert_eq!(stats.snapshot().sink_errors, 1);
        assert_eq!(
            events.lock().as_slice(),
            &[BridgeEvent::SinkError {
                sink_name: "failing".to_string(),
                error: "intentional failure".to_string(),
            }]
        );
    }

    #[test]
    fn test_start_sinks_reports_failure() {
        let sink = Arc::new(FailingSink {
            attempts: AtomicUsize::new(0),
            fail_start: true,
        });
        let (dispatcher, _) = dispatcher(vec![sink]);

        let result = dispatcher.start_sinks();
        assert!(matches!(
            result,
            Err(StreamLogError::SinkStartFailed { ref sink_name, .. }) if sink_name == "failing"
        ));
    }

    #[test]
    fn test_stop_sinks_calls_on_stop() {
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _) = dispatcher(vec![sink.clone()]);

        dispatcher.stop_sinks();
        assert!(sink.stopped.load(Ordering::SeqCst));
    }
}
