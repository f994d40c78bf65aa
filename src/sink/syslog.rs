//! RFC 5424 syslog over UDP.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use chrono::Utc;
use parking_lot::Mutex;

use crate::sink::Sink;
use crate::{Frame, SinkError};

/// `user.info`: facility 1, severity 6.
const DEFAULT_PRIORITY: u8 = 22;

/// RFC 5424 timestamp with millisecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A sink that sends each line as a syslog packet to a remote collector.
///
/// Packets look like `<22>1 2026-01-02T03:04:05.678Z host app - - - text`.
/// The socket is bound and the target resolved lazily on the first frame.
/// When a send fails both are dropped, so the next frame binds and resolves
/// again; the failed frame itself is reported and not retried.
///
/// # Example
///
/// ```no_run
/// use stream_log::SyslogUdpSink;
///
/// let sink = SyslogUdpSink::new("logs.example.com:514", "gateway")
///     .with_hostname("unit-7");
/// ```
pub struct SyslogUdpSink {
    name: String,
    target: String,
    app: String,
    hostname: String,
    local_port: u16,
    priority: u8,
    state: Mutex<UdpState>,
}

#[derive(Default)]
struct UdpState {
    socket: Option<UdpSocket>,
    address: Option<SocketAddr>,
}

impl SyslogUdpSink {
    /// Creates a sink sending to `target` (`host:port`) as application `app`.
    ///
    /// The hostname defaults to `$HOSTNAME`, or `-` when unset.
    pub fn new(target: impl Into<String>, app: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            name: format!("syslog:{target}"),
            target,
            app: app.into(),
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "-".to_string()),
            local_port: 0,
            priority: DEFAULT_PRIORITY,
            state: Mutex::new(UdpState::default()),
        }
    }

    /// Sets the HOSTNAME field of each packet.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Binds the sending socket to a fixed local port. Default: any port.
    #[must_use]
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Sets the PRI value (`facility * 8 + severity`). Default: 22.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    fn packet(&self, frame: &Frame<'_>) -> String {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
        format!(
            "<{}>1 {} {} {} - - - {}",
            self.priority,
            timestamp,
            self.hostname,
            self.app,
            frame.text()
        )
    }

    fn resolve(&self) -> Result<SocketAddr, SinkError> {
        self.target
            .to_socket_addrs()
            .map_err(|e| SinkError::network(&self.target, e))?
            .next()
            .ok_or_else(|| SinkError::AddressResolution {
                target: self.target.clone(),
            })
    }

    fn bind(&self, remote: SocketAddr) -> Result<UdpSocket, SinkError> {
        let local: SocketAddr = if remote.is_ipv4() {
            ([0, 0, 0, 0], self.local_port).into()
        } else {
            ([0u16; 8], self.local_port).into()
        };
        UdpSocket::bind(local).map_err(|e| SinkError::network(&self.target, e))
    }
}

impl Sink for SyslogUdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        let mut state = self.state.lock();

        if state.address.is_none() {
            state.address = Some(self.resolve()?);
        }
        if state.socket.is_none() {
            if let Some(address) = state.address {
                state.socket = Some(self.bind(address)?);
            }
        }
        let (Some(socket), Some(address)) = (state.socket.as_ref(), state.address) else {
            return Err(SinkError::NotInitialized);
        };

        let packet = self.packet(frame);
        match socket.send_to(packet.as_bytes(), address) {
            Ok(n) if n > 0 => {
                tracing::trace!(sequence = frame.sequence(), bytes = n, "syslog packet sent");
                Ok(())
            }
            Ok(_) => {
                *state = UdpState::default();
                Err(SinkError::write_failed("syslog packet not sent"))
            }
            Err(e) => {
                *state = UdpState::default();
                Err(SinkError::network(&self.target, e))
            }
        }
    }
}
