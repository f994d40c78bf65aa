//! Registration of a bridge's producer with the host logging system.

use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::{SharedProducer, StreamLogError};

/// A host log registry that accepts byte-stream destinations.
///
/// [`LogBridge::setup()`](crate::LogBridge::setup) makes the one call a host
/// needs at startup.
pub trait LogRegistry {
    /// Adds `producer` as a destination for formatted log output.
    fn add_sink(&mut self, producer: SharedProducer) -> Result<(), StreamLogError>;
}

/// Collects producers; the host writes to them however it likes.
impl LogRegistry for Vec<SharedProducer> {
    fn add_sink(&mut self, producer: SharedProducer) -> Result<(), StreamLogError> {
        self.push(producer);
        Ok(())
    }
}

/// Installs the producer as the writer of a global `tracing` subscriber.
///
/// Events are formatted by `tracing_subscriber::fmt` without ANSI colors,
/// one line per event. This crate's own diagnostics are filtered out so the
/// pump never logs into the ring it drains.
///
/// # Example
///
/// ```no_run
/// use stream_log::{StreamLog, TracingRegistry, WriterSink};
/// use tracing_subscriber::filter::LevelFilter;
///
/// let bridge = StreamLog::builder().add_sink(WriterSink::stderr()).build()?;
/// let mut pump = bridge.setup(&mut TracingRegistry::new(LevelFilter::INFO))?;
///
/// tracing::info!("hello");
/// pump.pump();
/// # Ok::<(), stream_log::StreamLogError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TracingRegistry {
    level: LevelFilter,
}

impl TracingRegistry {
    /// Registry that forwards events at `level` and above.
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// The formatting layer `add_sink` installs, for composing with other layers.
    pub fn layer<S>(&self, producer: SharedProducer) -> impl Layer<S> + Send + Sync
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        tracing_subscriber::fmt::layer()
            .with_writer(producer)
            .with_ansi(false)
            .with_filter(feedback_filter(self.level))
    }
}

impl Default for TracingRegistry {
    fn default() -> Self {
        Self::new(LevelFilter::INFO)
    }
}

impl LogRegistry for TracingRegistry {
    fn add_sink(&mut self, producer: SharedProducer) -> Result<(), StreamLogError> {
        tracing_subscriber::registry()
            .with(self.layer(producer))
            .try_init()
            .map_err(|e| StreamLogError::RegistryInstall(e.to_string()))
    }
}

/// Passes events at `level` and above, except those from this crate.
pub fn feedback_filter(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(env!("CARGO_CRATE_NAME"), LevelFilter::OFF)
}
