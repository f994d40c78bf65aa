//! Multi-sink example.
//!
//! Demonstrates delivering log lines to a file and a channel at the same
//! time, with a stderr mirror that also shows lines the file never gets.
//!
//! Run with: cargo run --example multi_sink

use std::io::Write;
use std::time::Duration;

use stream_log::{BridgeEvent, ChannelSink, FileSink, LogLine, StreamLog};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics from the bridge itself go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (tx, mut rx) = mpsc::channel::<LogLine>(100);

    println!("Writing to multi_sink.log and processing in real-time...");

    let session = StreamLog::builder()
        .frame_capacity(64)
        .mirror_to_stderr()
        .add_sink(FileSink::append("multi_sink.log").with_sync_every_entry(false))
        .add_sink(ChannelSink::new(tx))
        .on_event(|event| match event {
            BridgeEvent::BytesDropped { dropped_bytes } => {
                eprintln!("Warning: dropped {} bytes", dropped_bytes);
            }
            BridgeEvent::LineDiscarded { dropped_bytes } => {
                eprintln!("Discarded a {} byte line", dropped_bytes);
            }
            BridgeEvent::SinkError { sink_name, error } => {
                eprintln!("Sink '{}' error: {}", sink_name, error);
            }
            BridgeEvent::MirrorError { error } => {
                eprintln!("Mirror error: {}", error);
            }
        })
        .start()
        .await?;

    // Spawn a task to process received lines
    let processor = tokio::spawn(async move {
        let mut line_count = 0;
        let mut byte_count = 0;

        while let Some(line) = rx.recv().await {
            line_count += 1;
            byte_count += line.len();
        }

        (line_count, byte_count)
    });

    let mut producer = session.producer();
    for i in 0..20 {
        writeln!(producer, "reading {i}: temperature=21.{i}")?;
        if i % 7 == 0 {
            // longer than the 64-byte frame, dropped by the default policy
            writeln!(producer, "{}", "x".repeat(100))?;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let stats = session.stats();
    session.stop().await?;

    let (lines, bytes) = processor.await?;
    println!("\nDone!");
    println!("  Lines processed: {}", lines);
    println!("  Bytes processed: {}", bytes);
    println!("  Lines discarded: {}", stats.lines_discarded);

    Ok(())
}
