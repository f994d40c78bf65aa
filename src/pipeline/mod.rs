//! Log pipeline components.
//!
//! The pipeline moves log bytes from the producer to the sinks:
//!
//! ```text
//! Producer → Ring Buffer → [pump] → Line Accumulator → Dispatcher → Sinks
//! ```
//!
//! - **Ring Buffer**: Lock-free SPSC byte queue, drops the newest bytes when full
//! - **Line Accumulator**: Assembles lines into bounded frames and applies the
//!   overlong policy
//! - **Dispatcher**: Fans out each frame to every registered sink
//!
//! The ring buffer keeps sink I/O off the producer's call path.

mod accumulator;
pub(crate) mod dispatch;
mod ring_buffer;

pub use accumulator::{LineAccumulator, Mirror};
pub(crate) use accumulator::LINE_TERMINATOR;
pub use dispatch::Dispatcher;
pub use ring_buffer::{byte_ring, RingConsumer, RingProducer};
