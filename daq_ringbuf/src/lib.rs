//! # daqcore Shared-Memory Transport
//!
//! A shared-memory, framed ring-buffer transport moving raw detector event
//! records between independent producer and consumer processes, plus the
//! companion run-monitoring counter segment.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ Producer proc   │    │  Shared Memory   │    │ Consumer proc   │
//! │                 │    │                  │    │                 │
//! │ RingProducer    ├───►│ [Header|Words]   ├───►│ RingConsumer    │
//! │                 │    │ head/tail ctrs   │    │                 │
//! └────────┬────────┘    └──────────────────┘    └─────────────────┘
//!          │
//!          │             ┌──────────────────┐    ┌─────────────────┐
//!          └────────────►│ RunInfo segment  ├───►│ Monitor proc    │
//!                        │ counters+ready   │    │ RunInfoReader   │
//!                        └──────────────────┘    └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use daq_ringbuf::{Record, RecordHeader, RetryPolicy, RingConsumer, RingProducer};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), daq_ringbuf::RingError> {
//! let dir = Path::new("/dev/shm");
//!
//! // Producer process
//! let mut producer = RingProducer::create(dir, "evt0", 4096)?;
//! let record = Record::new(RecordHeader::default(), vec![1, 2, 3]);
//! producer.enqueue(&record, &RetryPolicy::default())?;
//!
//! // Consumer process
//! let mut consumer = RingConsumer::attach(dir, "evt0")?;
//! let record = consumer.dequeue(&RetryPolicy::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Framing**: a reader only ever observes complete records; a partial
//!   frame is never published.
//! - **FIFO**: within one buffer, delivery order equals enqueue order.
//!   Fan-out uses N independent buffers with no cross-buffer ordering.
//! - **Backpressure**: a full buffer stalls the producer (bounded-sleep
//!   retry via [`RetryPolicy`]); data is never dropped.
//! - **Failure taxonomy**: "buffer currently full" is transient and
//!   retryable; "record larger than the buffer" and "frame validation
//!   failed" are permanent and poison the endpoint.
//!
//! ## Thread Safety
//!
//! - [`RingProducer`]: NOT thread-safe - single producer process per buffer
//! - [`RingConsumer`]: NOT thread-safe - single consumer process per buffer
//! - [`RunInfoReader`]: read-only; any number of monitor processes

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod error;
pub mod frame;
pub mod platform;
pub mod ring;
pub mod runinfo;

pub use arena::ShmArena;
pub use error::{FrameError, RingError, RingResult};
pub use frame::{FRAME_OVERHEAD_WORDS, Record, RecordHeader, TRAILER_MAGIC};
pub use ring::{RetryPolicy, RingConsumer, RingProducer};
pub use runinfo::{RunInfo, RunInfoReader, RunInfoSnapshot};

/// Initialize tracing for transport processes.
///
/// Installs a compact fmt subscriber driven by `RUST_LOG`. Binaries with
/// their own CLI switches install their own subscriber instead.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
