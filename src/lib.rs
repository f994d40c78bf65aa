//! # stream-log
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Deferred log delivery with a producer that never blocks.
//!
//! `stream-log` takes formatted log bytes from any context, queues them in a
//! fixed-size lock-free ring, and later assembles them into bounded frames
//! that are handed to one or more sinks (file, syslog, channel, closure).
//! Slow sink I/O never reaches the code that logs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stream_log::{ChannelSink, FileSink, LogLine, StreamLog};
//! use tokio::sync::mpsc;
//! use tracing_subscriber::filter::LevelFilter;
//!
//! # async fn run() -> Result<(), stream_log::StreamLogError> {
//! let (tx, mut rx) = mpsc::channel::<LogLine>(64);
//!
//! let session = StreamLog::builder()
//!     .frame_capacity(622)
//!     .add_sink(FileSink::append("device.log"))
//!     .add_sink(ChannelSink::new(tx))
//!     .on_event(|e| eprintln!("log bridge: {e:?}"))
//!     .start()
//!     .await?;
//! session.install_tracing(LevelFilter::INFO)?;
//!
//! tracing::info!(counter = 1, "testing");
//!
//! // Lines arrive as owned copies
//! if let Some(line) = rx.recv().await {
//!     print!("{}", line.text());
//! }
//!
//! session.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate keeps a strict boundary between two sides:
//!
//! - **Producer**: Copies bytes into the ring; never waits, drops on overflow
//! - **Ring Buffer**: Lock-free SPSC byte queue of fixed capacity
//! - **Pump**: Drains the ring, assembles lines, applies the overlong policy
//!   and calls every sink
//!
//! Pump manually with [`LogBridge::pump()`] or let a [`Session`] pump on a
//! tokio interval.

#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod bridge;
mod builder;
mod config;
mod error;
mod event;
mod frame;
mod line;
pub mod pipeline;
mod registry;
mod session;
mod sink;
mod stats;

pub use bridge::{LogBridge, LogProducer, LogPump, ProducerWriter, SharedProducer};
pub use builder::{StreamLog, StreamLogBuilder};
pub use config::{
    BridgeConfig, OverlongPolicy, DEFAULT_FRAME_CAPACITY, DEFAULT_PUMP_INTERVAL,
    DEFAULT_RING_CAPACITY,
};
pub use error::{SinkError, StreamLogError};
pub use event::{event_callback, BridgeEvent, EventCallback};
pub use frame::Frame;
pub use line::LogLine;
pub use registry::{feedback_filter, LogRegistry, TracingRegistry};
pub use session::Session;
pub use sink::{CallbackSink, ChannelSink, FileSink, Sink, SyslogUdpSink, WriterSink};
pub use stats::BridgeStats;
