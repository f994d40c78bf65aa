//! Builder API for log bridges.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BridgeConfig, OverlongPolicy};
use crate::event::{event_callback, EventCallback, EventEmitter};
use crate::pipeline::{byte_ring, Dispatcher, LineAccumulator, Mirror};
use crate::sink::Sink;
use crate::stats::StatsState;
use crate::{BridgeEvent, LogBridge, LogProducer, LogPump, Session, StreamLogError};

/// Builder for configuring a log bridge.
///
/// Use [`StreamLog::builder()`] to create a new builder.
///
/// # Example
///
/// ```no_run
/// use stream_log::{FileSink, StreamLog, SyslogUdpSink};
///
/// # async fn run() -> Result<(), stream_log::StreamLogError> {
/// let session = StreamLog::builder()
///     .frame_capacity(128)
///     .split_long_entries(true)
///     .mirror_to_stderr()
///     .add_sink(FileSink::append("device.log"))
///     .add_sink(SyslogUdpSink::new("logs.example.com:514", "gateway"))
///     .on_event(|e| eprintln!("log bridge: {e:?}"))
///     .start()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// [`StreamLog::builder()`]: crate::StreamLog::builder
#[must_use]
pub struct StreamLogBuilder {
    /// Capacities, overlong policy and pump interval.
    config: BridgeConfig,
    /// Configured sinks, in dispatch order.
    sinks: Vec<Arc<dyn Sink>>,
    /// Stream that sees every assembled frame.
    mirror: Option<Mirror>,
    /// Event callback.
    event_callback: Option<EventCallback>,
}

impl Default for StreamLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamLogBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            sinks: Vec::new(),
            mirror: None,
            event_callback: None,
        }
    }

    /// Set the ring buffer capacity in bytes.
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.config.ring_capacity = capacity;
        self
    }

    /// Set the largest frame payload in bytes.
    pub fn frame_capacity(mut self, capacity: usize) -> Self {
        self.config.frame_capacity = capacity;
        self
    }

    /// Split overlong lines across frames instead of discarding them.
    pub fn split_long_entries(mut self, split: bool) -> Self {
        self.config.overlong = OverlongPolicy::from_split(split);
        self
    }

    /// Set the overlong-line policy.
    pub fn overlong(mut self, policy: OverlongPolicy) -> Self {
        self.config.overlong = policy;
        self
    }

    /// Set how often a [`Session`] pumps.
    pub fn pump_interval(mut self, interval: Duration) -> Self {
        self.config.pump_interval = interval;
        self
    }

    /// Copy every assembled frame to `writer`, including discarded ones.
    ///
    /// Only one mirror is supported; setting it again replaces the last one.
    pub fn mirror_to<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.mirror = Some(Box::new(writer));
        self
    }

    /// Mirror to the process's standard error.
    pub fn mirror_to_stderr(self) -> Self {
        self.mirror_to(io::stderr())
    }

    /// Remove the mirror.
    pub fn no_mirror(mut self) -> Self {
        self.mirror = None;
        self
    }

    /// Add a sink. Frames are delivered to sinks in the order they were added.
    pub fn add_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is shared with other code.
    pub fn add_shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Set a callback to receive runtime events.
    ///
    /// Events include ring overflow, discarded lines, sink and mirror errors.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(BridgeEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Set an already shared event callback.
    pub fn on_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Set custom bridge configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the builder configuration.
    fn validate(&self) -> Result<(), StreamLogError> {
        self.config.validate()?;
        if self.sinks.is_empty() {
            return Err(StreamLogError::NoSinksConfigured);
        }
        Ok(())
    }

    /// Build a bridge for manual pumping.
    ///
    /// Calls `on_start()` on every sink.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A capacity or the pump interval is zero
    /// - No sinks are configured
    /// - Any sink fails to start
    pub fn build(self) -> Result<LogBridge, StreamLogError> {
        self.validate()?;

        let stats = Arc::new(StatsState::default());
        let events = EventEmitter::new(self.event_callback);

        let dispatcher = Dispatcher::new(self.sinks, events.clone(), Arc::clone(&stats));
        dispatcher.start_sinks()?;
        let sink_count = dispatcher.sink_count();

        let accumulator = LineAccumulator::new(
            self.config.frame_capacity,
            self.config.overlong,
            self.mirror,
            dispatcher,
            Arc::clone(&stats),
            events.clone(),
        );
        let (ring_tx, ring_rx) = byte_ring(self.config.ring_capacity);

        tracing::debug!(
            ring_capacity = self.config.ring_capacity,
            frame_capacity = self.config.frame_capacity,
            sinks = sink_count,
            overlong = ?self.config.overlong,
            "log bridge built"
        );

        Ok(LogBridge::new(
            LogProducer::new(ring_tx, Arc::clone(&stats)),
            LogPump::new(ring_rx, accumulator, stats, events),
        ))
    }

    /// Build the bridge and pump it in the background.
    ///
    /// Returns a [`Session`] handle to control the pump.
    ///
    /// # Errors
    ///
    /// Same as [`build()`](Self::build).
    pub async fn start(self) -> Result<Session, StreamLogError> {
        let interval = self.config.pump_interval;
        let (producer, pump) = self.build()?.into_shared();
        Ok(Session::spawn(producer, pump, interval))
    }
}

/// Main entry point for stream-log.
///
/// Use [`StreamLog::builder()`] to start configuring a bridge.
pub struct StreamLog;

impl StreamLog {
    /// Creates a new builder for configuring a log bridge.
    pub fn builder() -> StreamLogBuilder {
        StreamLogBuilder::new()
    }
}
