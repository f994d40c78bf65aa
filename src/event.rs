//! Runtime events for monitoring bridge health.
//!
//! Events are non-fatal notifications. They are always emitted from the
//! pumping side, never from the producer, so a callback may block or log
//! without stalling the code that produced the log bytes.

use std::sync::Arc;

/// Runtime events emitted while pumping.
///
/// # Example
///
/// ```
/// use stream_log::BridgeEvent;
///
/// fn handle_event(event: BridgeEvent) {
///     match event {
///         BridgeEvent::BytesDropped { dropped_bytes } => {
///             eprintln!("ring full: {} bytes lost", dropped_bytes);
///         }
///         BridgeEvent::LineDiscarded { dropped_bytes } => {
///             eprintln!("overlong line of {} bytes discarded", dropped_bytes);
///         }
///         BridgeEvent::SinkError { sink_name, error } => {
///             eprintln!("sink '{}' error: {}", sink_name, error);
///         }
///         BridgeEvent::MirrorError { error } => {
///             eprintln!("mirror error: {}", error);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The ring buffer was full and the producer's newest bytes were dropped.
    ///
    /// Reported once per pump with the number of bytes lost since the
    /// previous report. Consider a larger `ring_capacity` or pumping more
    /// often.
    BytesDropped {
        /// Bytes dropped since the last report.
        dropped_bytes: u64,
    },

    /// A line longer than the frame capacity was dropped whole.
    ///
    /// Only emitted under [`OverlongPolicy::Discard`](crate::OverlongPolicy::Discard),
    /// once the line's terminator has been seen.
    LineDiscarded {
        /// Length of the discarded line including its terminator.
        dropped_bytes: u64,
    },

    /// A sink returned an error for a frame. The frame is not retried.
    SinkError {
        /// Name of the sink that errored.
        sink_name: String,
        /// Description of the error.
        error: String,
    },

    /// Writing to the mirror stream failed.
    MirrorError {
        /// Description of the error.
        error: String,
    },
}

/// Callback type for receiving runtime events.
///
/// Register one via [`StreamLogBuilder::on_event()`].
///
/// [`StreamLogBuilder::on_event()`]: crate::StreamLogBuilder::on_event
pub type EventCallback = Arc<dyn Fn(BridgeEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use stream_log::{event_callback, BridgeEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// callback(BridgeEvent::BytesDropped { dropped_bytes: 3 });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(BridgeEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Optional callback shared by the pump-side components.
#[derive(Clone, Default)]
pub(crate) struct EventEmitter {
    callback: Option<EventCallback>,
}

impl EventEmitter {
    pub(crate) fn new(callback: Option<EventCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn emit(&self, event: BridgeEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}
