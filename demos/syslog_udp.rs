//! Syslog over UDP example.
//!
//! Sends `tracing` output to a remote syslog collector as RFC 5424 packets.
//!
//! Run with: cargo run --example syslog_udp -- logs.example.com:514
//!
//! Without an argument a local receiver is started and the packets it gets
//! are printed.

use std::net::UdpSocket;
use std::time::Duration;

use stream_log::{StreamLog, SyslogUdpSink};
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (target, receiver) = match std::env::args().nth(1) {
        Some(target) => (target, None),
        None => {
            let socket = UdpSocket::bind("127.0.0.1:0")?;
            socket.set_read_timeout(Some(Duration::from_millis(500)))?;
            (socket.local_addr()?.to_string(), Some(socket))
        }
    };

    println!("Sending syslog packets to {target}");

    let session = StreamLog::builder()
        .frame_capacity(128)
        .add_sink(SyslogUdpSink::new(target, "example"))
        .on_event(|event| eprintln!("log bridge: {event:?}"))
        .start()
        .await?;
    session.install_tracing(LevelFilter::INFO)?;

    for counter in 0..5 {
        tracing::info!("testing counter={}", counter);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    session.stop().await?;

    if let Some(socket) = receiver {
        let mut buf = [0u8; 2048];
        while let Ok(n) = socket.recv(&mut buf) {
            println!("received: {}", String::from_utf8_lossy(&buf[..n]));
        }
    }

    Ok(())
}
