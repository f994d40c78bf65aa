//! Custom sink example.
//!
//! Demonstrates how to implement the Sink trait for a custom log destination
//! and feed it from `tracing`.
//!
//! Run with: cargo run --example custom_sink

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use stream_log::{Frame, Sink, SinkError, StreamLog};
use tracing_subscriber::filter::LevelFilter;

/// A custom sink that counts lines per level.
struct LevelCountSink {
    name: String,
    errors: AtomicU64,
    warnings: AtomicU64,
    other: AtomicU64,
}

impl LevelCountSink {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            errors: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            other: AtomicU64::new(0),
        }
    }
}

impl Sink for LevelCountSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&self) -> Result<(), SinkError> {
        println!("[{}] Starting...", self.name);
        Ok(())
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        let text = frame.text();
        let counter = if text.contains(" ERROR ") {
            &self.errors
        } else if text.contains(" WARN ") {
            &self.warnings
        } else {
            &self.other
        };
        counter.fetch_add(1, Ordering::Relaxed);
        println!("[{}] #{} {}", self.name, frame.sequence(), text);
        Ok(())
    }

    fn on_stop(&self) -> Result<(), SinkError> {
        println!("[{}] Stopping. Final counts:", self.name);
        println!("  Errors:   {}", self.errors.load(Ordering::Relaxed));
        println!("  Warnings: {}", self.warnings.load(Ordering::Relaxed));
        println!("  Other:    {}", self.other.load(Ordering::Relaxed));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = StreamLog::builder()
        .add_sink(LevelCountSink::new("level-count"))
        .start()
        .await?;
    session.install_tracing(LevelFilter::INFO)?;

    for i in 1..=6 {
        match i % 3 {
            0 => tracing::error!(attempt = i, "upload failed"),
            1 => tracing::info!(attempt = i, "uploading"),
            _ => tracing::warn!(attempt = i, "slow response"),
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    session.stop().await?;

    println!("\nDone!");

    Ok(())
}
