//! Error types for stream-log.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`StreamLogError`]): Prevent a bridge or session from being built
//! - **Sink errors** ([`SinkError`]): Returned by a [`Sink`](crate::Sink) for one frame;
//!   the pipeline reports them through [`EventCallback`](crate::EventCallback) and moves on

use std::path::PathBuf;

/// Fatal errors raised while building or installing a log bridge.
///
/// Nothing on the producer path ever returns an error: a full ring drops
/// bytes silently and a failing sink only produces an event. These errors
/// come from [`StreamLogBuilder::build()`], [`StreamLogBuilder::start()`] and
/// registry installation.
///
/// [`StreamLogBuilder::build()`]: crate::StreamLogBuilder::build
/// [`StreamLogBuilder::start()`]: crate::StreamLogBuilder::start
#[derive(Debug, thiserror::Error)]
pub enum StreamLogError {
    /// The ring buffer capacity must hold at least one byte.
    #[error("invalid ring capacity {capacity}: must be at least 1 byte")]
    InvalidRingCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// The frame assembly buffer must hold at least one byte.
    #[error("invalid frame capacity {capacity}: must be at least 1 byte")]
    InvalidFrameCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// The pump interval used by a [`Session`](crate::Session) must be non-zero.
    #[error("pump interval must be greater than zero")]
    InvalidPumpInterval,

    /// No sinks were configured before building.
    #[error("no sinks configured - add at least one sink")]
    NoSinksConfigured,

    /// A sink failed during initialization.
    #[error("sink '{sink_name}' failed to start: {reason}")]
    SinkStartFailed {
        /// Name of the sink that failed.
        sink_name: String,
        /// Why the sink failed to start.
        reason: String,
    },

    /// Registering the producer with the host log registry failed.
    #[error("failed to register with log registry: {0}")]
    RegistryInstall(String),

    /// The background pump task panicked or was cancelled.
    #[error("pump task failed: {0}")]
    PumpTaskFailed(String),
}

/// Errors that can occur within a [`Sink`](crate::Sink) implementation.
///
/// Sink errors never travel back to the producer. The dispatcher emits a
/// [`BridgeEvent::SinkError`] and continues with the next sink and the next
/// frame; there is no retry.
///
/// [`BridgeEvent::SinkError`]: crate::BridgeEvent::SinkError
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// A write operation failed.
    #[error("write failed: {reason}")]
    WriteFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// File I/O error.
    #[error("file error: {path}: {source}")]
    FileError {
        /// Path to the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Socket error while talking to a network target.
    #[error("network error for {target}: {source}")]
    Network {
        /// The `host:port` the sink sends to.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The network target did not resolve to any address.
    #[error("could not resolve {target}")]
    AddressResolution {
        /// The `host:port` that failed to resolve.
        target: String,
    },

    /// The receiving channel was closed.
    #[error("channel closed")]
    ChannelClosed,

    /// The receiving channel is full; the line was not queued.
    #[error("channel full")]
    ChannelFull,

    /// The sink has no open handle to write to.
    #[error("sink not initialized")]
    NotInitialized,

    /// Custom error for user-implemented sinks.
    #[error("{0}")]
    Custom(String),
}

impl SinkError {
    /// Creates a custom sink error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Creates a write failed error with the given reason.
    pub fn write_failed(reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            reason: reason.into(),
        }
    }

    /// Creates a file error for the given path.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileError {
            path: path.into(),
            source,
        }
    }

    /// Creates a network error for the given target.
    pub fn network(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Network {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_log_error_display() {
        let err = StreamLogError::InvalidRingCapacity { capacity: 0 };
        assert_eq!(
            err.to_string(),
            "invalid ring capacity 0: must be at least 1 byte"
        );
    }

    #[test]
    fn test_sink_start_failed_display() {
        let err = StreamLogError::SinkStartFailed {
            sink_name: "syslog".to_string(),
            reason: "no route".to_string(),
        };
        assert_eq!(err.to_string(), "sink 'syslog' failed to start: no route");
    }

    #[test]
    fn test_sink_error_custom() {
        let err = SinkError::custom("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_sink_error_write_failed() {
        let err = SinkError::write_failed("pipe closed");
        assert_eq!(err.to_string(), "write failed: pipe closed");
    }

    #[test]
    fn test_sink_error_file_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SinkError::file_error("/tmp/device.log", io_err);
        assert!(err.to_string().contains("/tmp/device.log"));
    }

    #[test]
    fn test_sink_error_network_keeps_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = SinkError::network("logs.example.com:514", io_err);
        assert!(err.to_string().contains("logs.example.com:514"));
        assert!(err.source().is_some());
    }
}
