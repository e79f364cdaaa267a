//! Single-producer single-consumer framed ring buffer over a shared arena.
//!
//! Exactly one producer process creates a buffer and exactly one consumer
//! process attaches to it. Fan-out to several consumers means several
//! independent buffers fed the same records; ordering holds per buffer
//! only.
//!
//! Publication protocol: the header carries monotonic `head` (words
//! written) and `tail` (words consumed) counters. The producer copies a
//! complete frame into the word area, then advances `head` with release
//! ordering; the consumer acquires `head` before touching the words, and
//! advances `tail` only after the frame is copied out and validated. A
//! reader therefore never observes a partial frame.

use crate::arena::ShmArena;
use crate::error::{FrameError, RingError, RingResult};
use crate::frame::{FRAME_OVERHEAD_WORDS, Record};
use crate::platform::current_pid;
use daq::consts::{CACHE_LINE_SIZE, RB_MAX_WORDS, RB_MIN_WORDS};
use static_assertions::const_assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Magic value identifying a ring buffer segment: `"DAQRING\0"`.
pub const RING_MAGIC: u64 = u64::from_le_bytes(*b"DAQRING\0");

/// Retry behavior for blocking enqueue/dequeue loops.
///
/// The transport itself never drops data: a full buffer stalls the
/// producer and an empty buffer stalls the consumer, both sleeping `poll`
/// between attempts. With `max_attempts = None` (the default) the loop
/// blocks indefinitely, which is the intended mode when the peer process
/// is supervised and guaranteed to keep running. A bounded policy turns
/// exhaustion into [`RingError::RetryExhausted`] so an operator sees the
/// stall instead of a silent hang.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Sleep between attempts.
    pub poll: Duration,
    /// Maximum attempts before giving up; `None` blocks indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll: Duration::from_micros(200),
            max_attempts: None,
        }
    }
}

/// Ring buffer control header, one cache line.
#[repr(C, align(64))]
struct RingHeader {
    /// Magic number for validation.
    magic: u64,
    /// Word capacity of the data section.
    capacity_words: u64,
    /// Total words ever published (monotonic).
    head: AtomicU64,
    /// Total words ever consumed (monotonic).
    tail: AtomicU64,
    /// Producer process ID.
    writer_pid: AtomicU32,
    /// Consumer process ID.
    reader_pid: AtomicU32,
    /// Set once the consumer has seen a corrupt frame.
    poisoned: AtomicU32,
    _pad: [u8; 20],
}

const_assert_eq!(std::mem::size_of::<RingHeader>(), CACHE_LINE_SIZE);
const_assert_eq!(std::mem::align_of::<RingHeader>(), CACHE_LINE_SIZE);

impl RingHeader {
    fn new(capacity_words: usize, writer_pid: u32) -> Self {
        Self {
            magic: RING_MAGIC,
            capacity_words: capacity_words as u64,
            head: AtomicU64::new(0),
            tail: AtomicU64::new(0),
            writer_pid: AtomicU32::new(writer_pid),
            reader_pid: AtomicU32::new(0),
            poisoned: AtomicU32::new(0),
            _pad: [0; 20],
        }
    }
}

fn segment_file_name(name: &str) -> String {
    format!("daq_{name}.ring")
}

fn validate_capacity(words: usize) -> RingResult<()> {
    if !(RB_MIN_WORDS..=RB_MAX_WORDS).contains(&words) {
        return Err(RingError::InvalidCapacity { words });
    }
    Ok(())
}

/// Producer endpoint of one ring buffer. Owns the segment.
pub struct RingProducer {
    arena: ShmArena,
    capacity: usize,
    scratch: Vec<u32>,
}

impl RingProducer {
    /// Create a new ring buffer of `capacity_words` payload words in `dir`
    /// and take exclusive producer ownership of it.
    pub fn create(dir: &Path, name: &str, capacity_words: usize) -> RingResult<Self> {
        validate_capacity(capacity_words)?;

        let mut arena = ShmArena::create(
            dir,
            name,
            &segment_file_name(name),
            std::mem::size_of::<RingHeader>(),
            capacity_words,
        )?;

        unsafe {
            std::ptr::write(
                arena.header_ptr_mut() as *mut RingHeader,
                RingHeader::new(capacity_words, current_pid()),
            );
        }
        fence(Ordering::Release);

        info!(buffer = name, capacity_words, "ring buffer created");

        Ok(Self {
            arena,
            capacity: capacity_words,
            scratch: Vec::new(),
        })
    }

    fn header(&self) -> &RingHeader {
        unsafe { &*(self.arena.header_ptr() as *const RingHeader) }
    }

    /// Buffer name.
    pub fn name(&self) -> &str {
        self.arena.name()
    }

    /// Fixed word capacity of this buffer.
    pub fn capacity_words(&self) -> usize {
        self.capacity
    }

    /// Words currently free.
    pub fn free_words(&self) -> usize {
        let header = self.header();
        let used = header.head.load(Ordering::Acquire) - header.tail.load(Ordering::Acquire);
        self.capacity - used as usize
    }

    /// Whether the buffer holds no unread records.
    pub fn is_empty(&self) -> bool {
        self.free_words() == self.capacity
    }

    /// Attempt to append one record.
    ///
    /// On [`RingError::Full`] the buffer is left unchanged and the call may
    /// be retried; [`RingError::TooLarge`] means the record can never fit
    /// and must not be retried.
    pub fn try_enqueue(&mut self, record: &Record) -> RingResult<()> {
        let needed = record.total_words();
        if needed > self.capacity {
            return Err(RingError::TooLarge {
                name: self.arena.name().to_string(),
                words: needed,
                capacity: self.capacity,
            });
        }

        let header = self.header();
        let head = header.head.load(Ordering::Acquire);
        let tail = header.tail.load(Ordering::Acquire);
        let free = self.capacity - (head - tail) as usize;
        if needed > free {
            return Err(RingError::Full {
                name: self.arena.name().to_string(),
                needed,
                free,
            });
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        record.encode_to(&mut scratch);
        let result = self.write_wrapped(head as usize % self.capacity, &scratch);
        self.scratch = scratch;
        result?;

        fence(Ordering::Release);
        self.header().head.store(head + needed as u64, Ordering::Release);

        debug!(
            buffer = self.arena.name(),
            words = needed,
            event = record.header.event,
            "record enqueued"
        );
        Ok(())
    }

    /// Append one record, stalling while the buffer is full.
    ///
    /// Transient [`RingError::Full`] conditions are absorbed by the retry
    /// loop; permanent errors surface immediately.
    pub fn enqueue(&mut self, record: &Record, policy: &RetryPolicy) -> RingResult<()> {
        let mut attempts: u32 = 0;
        loop {
            match self.try_enqueue(record) {
                Err(RingError::Full { .. }) => {
                    attempts = attempts.saturating_add(1);
                    if let Some(max) = policy.max_attempts
                        && attempts >= max
                    {
                        warn!(
                            buffer = self.arena.name(),
                            attempts, "enqueue retry limit exhausted"
                        );
                        return Err(RingError::RetryExhausted {
                            name: self.arena.name().to_string(),
                            attempts,
                        });
                    }
                    std::thread::sleep(policy.poll);
                }
                other => return other,
            }
        }
    }

    fn write_wrapped(&mut self, start: usize, words: &[u32]) -> RingResult<()> {
        let first = words.len().min(self.capacity - start);
        self.arena.write_words(start, &words[..first])?;
        if first < words.len() {
            self.arena.write_words(0, &words[first..])?;
        }
        Ok(())
    }
}

/// Consumer endpoint of one ring buffer.
pub struct RingConsumer {
    arena: ShmArena,
    capacity: usize,
    scratch: Vec<u32>,
    poisoned: bool,
}

impl RingConsumer {
    /// Attach to an existing ring buffer as its single consumer.
    pub fn attach(dir: &Path, name: &str) -> RingResult<Self> {
        let arena = ShmArena::attach(
            dir,
            name,
            &segment_file_name(name),
            std::mem::size_of::<RingHeader>(),
        )?;

        let header = unsafe { &*(arena.header_ptr() as *const RingHeader) };
        if header.magic != RING_MAGIC || header.capacity_words as usize != arena.data_words() {
            return Err(RingError::BadSegment {
                name: name.to_string(),
            });
        }

        let previous = header.reader_pid.swap(current_pid(), Ordering::AcqRel);
        if previous != 0 {
            warn!(
                buffer = name,
                previous_reader = previous,
                "buffer already had a consumer; taking over"
            );
        }

        let capacity = header.capacity_words as usize;
        info!(buffer = name, capacity_words = capacity, "consumer attached");

        Ok(Self {
            arena,
            capacity,
            scratch: Vec::new(),
            poisoned: false,
        })
    }

    fn header(&self) -> &RingHeader {
        unsafe { &*(self.arena.header_ptr() as *const RingHeader) }
    }

    /// Buffer name.
    pub fn name(&self) -> &str {
        self.arena.name()
    }

    /// Fixed word capacity of this buffer.
    pub fn capacity_words(&self) -> usize {
        self.capacity
    }

    /// Whether a corrupt frame has permanently disabled this consumer.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Whether the buffer currently holds no unread records.
    pub fn is_empty(&self) -> bool {
        let header = self.header();
        header.head.load(Ordering::Acquire) == header.tail.load(Ordering::Acquire)
    }

    /// Attempt to remove the oldest record.
    ///
    /// Returns `Ok(None)` when the buffer holds no complete record. A
    /// frame-validation failure poisons the consumer: the corrupt frame is
    /// reported once and every subsequent call returns
    /// [`RingError::Poisoned`].
    pub fn try_dequeue(&mut self) -> RingResult<Option<Record>> {
        if self.poisoned {
            return Err(RingError::Poisoned {
                name: self.arena.name().to_string(),
            });
        }

        let (head, tail) = {
            let header = self.header();
            (
                header.head.load(Ordering::Acquire),
                header.tail.load(Ordering::Acquire),
            )
        };
        let available = (head - tail) as usize;
        if available == 0 {
            return Ok(None);
        }

        let declared = self.arena.read_word(tail as usize % self.capacity)?;
        if (declared as usize) < FRAME_OVERHEAD_WORDS {
            return Err(self.poison(FrameError::DeclaredTooShort {
                declared,
                min: FRAME_OVERHEAD_WORDS as u32,
            }));
        }
        if declared as usize > self.capacity {
            return Err(self.poison(FrameError::ExceedsCapacity {
                declared,
                capacity: self.capacity as u32,
            }));
        }
        if declared as usize > available {
            // Frame longer than what has been published; with release
            // ordering on head this cannot happen for a well-formed
            // producer, so treat it as not-yet-ready rather than guessing.
            return Ok(None);
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.resize(declared as usize, 0);
        let read = self.read_wrapped(tail as usize % self.capacity, &mut scratch);
        let decoded = read.map(|()| Record::decode(&scratch));
        self.scratch = scratch;

        match decoded? {
            Ok(record) => {
                self.header()
                    .tail
                    .store(tail + declared as u64, Ordering::Release);
                debug!(
                    buffer = self.arena.name(),
                    words = declared,
                    event = record.header.event,
                    "record dequeued"
                );
                Ok(Some(record))
            }
            Err(source) => Err(self.poison(source)),
        }
    }

    /// Remove the oldest record, stalling while the buffer is empty.
    pub fn dequeue(&mut self, policy: &RetryPolicy) -> RingResult<Record> {
        let mut attempts: u32 = 0;
        loop {
            if let Some(record) = self.try_dequeue()? {
                return Ok(record);
            }
            attempts = attempts.saturating_add(1);
            if let Some(max) = policy.max_attempts
                && attempts >= max
            {
                return Err(RingError::RetryExhausted {
                    name: self.arena.name().to_string(),
                    attempts,
                });
            }
            std::thread::sleep(policy.poll);
        }
    }

    fn read_wrapped(&self, start: usize, out: &mut [u32]) -> RingResult<()> {
        let first = out.len().min(self.capacity - start);
        let (head_part, tail_part) = out.split_at_mut(first);
        self.arena.read_words(start, head_part)?;
        if !tail_part.is_empty() {
            self.arena.read_words(0, tail_part)?;
        }
        Ok(())
    }

    fn poison(&mut self, source: FrameError) -> RingError {
        self.poisoned = true;
        self.header().poisoned.store(1, Ordering::Release);
        error!(
            buffer = self.arena.name(),
            %source,
            "corrupt frame; buffer poisoned"
        );
        RingError::CorruptFrame {
            name: self.arena.name().to_string(),
            source,
        }
    }
}
