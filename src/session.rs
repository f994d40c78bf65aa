//! Background pumping on a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::filter::LevelFilter;

use crate::registry::{LogRegistry, TracingRegistry};
use crate::stats::StatsState;
use crate::{BridgeStats, LogPump, SharedProducer, StreamLogError};

/// Commands sent to the pump task.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    /// Drain once more, stop the sinks and exit.
    Stop,
}

/// Handle to a bridge being pumped in the background.
///
/// The `Session` is returned by [`StreamLogBuilder::start()`]. A tokio task
/// pumps the bridge every `pump_interval` until [`stop()`](Session::stop) is
/// called or the `Session` is dropped. Each pump runs on the blocking pool,
/// so sinks may do ordinary blocking I/O.
///
/// # Lifecycle
///
/// 1. Created by [`StreamLogBuilder::start()`]
/// 2. Producers write through [`producer()`](Session::producer) or the
///    installed `tracing` subscriber
/// 3. Call [`stop()`](Session::stop) to drain the ring and stop the sinks
/// 4. Dropping the `Session` also stops the pump task (but prefer explicit `stop()`)
///
/// # Example
///
/// ```no_run
/// use stream_log::{FileSink, StreamLog};
/// use tracing_subscriber::filter::LevelFilter;
///
/// # async fn run() -> Result<(), stream_log::StreamLogError> {
/// let session = StreamLog::builder()
///     .add_sink(FileSink::append("device.log"))
///     .start()
///     .await?;
/// session.install_tracing(LevelFilter::INFO)?;
///
/// tracing::info!("booted");
///
/// session.stop().await?;
/// # Ok(())
/// # }
/// ```
///
/// [`StreamLogBuilder::start()`]: crate::StreamLogBuilder::start
pub struct Session {
    running: Arc<AtomicBool>,
    producer: SharedProducer,
    stats: Arc<StatsState>,
    cmd_tx: mpsc::Sender<SessionCommand>,
    pump_handle: Option<JoinHandle<Result<(), StreamLogError>>>,
}

impl Session {
    /// Spawns the pump task on the current runtime.
    pub(crate) fn spawn(producer: SharedProducer, pump: LogPump, interval: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let stats = pump.stats_state();
        let pump = Arc::new(Mutex::new(pump));
        let (cmd_tx, cmd_rx) = mpsc::channel(1);

        let pump_handle = tokio::spawn(run_pump(pump, interval, cmd_rx));
        tracing::debug!(?interval, "log pump started");

        Self {
            running,
            producer,
            stats,
            cmd_tx,
            pump_handle: Some(pump_handle),
        }
    }

    /// A cloneable handle for writing log bytes.
    pub fn producer(&self) -> SharedProducer {
        self.producer.clone()
    }

    /// Returns `true` until the session is stopped or its pump task ends.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self
                .pump_handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Returns current bridge statistics without waiting for a pump.
    pub fn stats(&self) -> BridgeStats {
        self.stats.snapshot()
    }

    /// Registers this session's producer with `registry`.
    pub fn register<R>(&self, registry: &mut R) -> Result<(), StreamLogError>
    where
        R: LogRegistry + ?Sized,
    {
        registry.add_sink(self.producer())
    }

    /// Makes this session the global `tracing` writer.
    ///
    /// See [`TracingRegistry`].
    pub fn install_tracing(&self, level: LevelFilter) -> Result<(), StreamLogError> {
        self.register(&mut TracingRegistry::new(level))
    }

    /// Gracefully stops the session.
    ///
    /// This will:
    /// 1. Stop the periodic pump
    /// 2. Drain the ring one last time
    /// 3. Call `on_stop()` on all sinks
    ///
    /// A line without its terminator stays undelivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the pump task or a sink panicked.
    pub async fn stop(mut self) -> Result<(), StreamLogError> {
        self.stop_internal().await
    }

    async fn stop_internal(&mut self) -> Result<(), StreamLogError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let _ = self.cmd_tx.send(SessionCommand::Stop).await;

        match self.pump_handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| StreamLogError::PumpTaskFailed(e.to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            // Dropped without stop(); the task drains and exits on its own
            let _ = self.cmd_tx.try_send(SessionCommand::Stop);
        }
    }
}

async fn run_pump(
    pump: Arc<Mutex<LogPump>>,
    interval: Duration,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
) -> Result<(), StreamLogError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pump_blocking(&pump, LogPump::pump).await?;
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Stop) | None => break,
            },
        }
    }

    pump_blocking(&pump, LogPump::stop).await?;
    tracing::debug!("log pump stopped");
    Ok(())
}

async fn pump_blocking<F, T>(pump: &Arc<Mutex<LogPump>>, f: F) -> Result<T, StreamLogError>
where
    F: FnOnce(&mut LogPump) -> T + Send + 'static,
    T: Send + 'static,
{
    let pump = Arc::clone(pump);
    tokio::task::spawn_blocking(move || {
        let mut guard = pump.lock();
        f(&mut *guard)
    })
    .await
    .map_err(|e| StreamLogError::PumpTaskFailed(e.to_string()))
}
