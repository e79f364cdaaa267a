//! Error types for the shared-memory transport.

use thiserror::Error;

/// Frame-level validation failure.
///
/// Any of these on the read side means the buffer contents can no longer be
/// trusted; the consumer is poisoned and the error is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Declared word count is smaller than the fixed frame overhead.
    #[error("declared length {declared} is below the {min}-word frame minimum")]
    DeclaredTooShort {
        /// Declared total word count.
        declared: u32,
        /// Minimum legal frame length.
        min: u32,
    },

    /// Declared word count does not match the words actually present.
    #[error("declared {declared} words but {available} were consumed")]
    LengthMismatch {
        /// Declared total word count.
        declared: u32,
        /// Words actually available/consumed.
        available: u32,
    },

    /// Declared word count can never fit in the buffer it was read from.
    #[error("declared {declared} words exceeds the buffer capacity of {capacity}")]
    ExceedsCapacity {
        /// Declared total word count.
        declared: u32,
        /// Capacity of the buffer in words.
        capacity: u32,
    },

    /// Body word count field disagrees with the declared total.
    #[error("body count {body} inconsistent with declared total {declared}")]
    BodyMismatch {
        /// Declared total word count.
        declared: u32,
        /// Body word count field.
        body: u32,
    },

    /// Closing trailer marker is wrong.
    #[error("bad trailer marker {found:#010x}")]
    BadTrailer {
        /// Value found in the trailer word.
        found: u32,
    },
}

/// Errors that can occur during shared-memory transport operations.
#[derive(Debug, Error)]
pub enum RingError {
    /// Segment already exists.
    #[error("Segment already exists: {name}")]
    AlreadyExists {
        /// Segment name.
        name: String,
    },

    /// Segment not found.
    #[error("Segment not found: {name}")]
    NotFound {
        /// Segment name.
        name: String,
    },

    /// Capacity outside the supported range.
    #[error("Invalid capacity: {words} words (must be {min}..={max})",
        min = daq::consts::RB_MIN_WORDS, max = daq::consts::RB_MAX_WORDS)]
    InvalidCapacity {
        /// Requested capacity in words.
        words: usize,
    },

    /// Segment header failed validation on attach.
    #[error("Segment '{name}' has an invalid header")]
    BadSegment {
        /// Segment name.
        name: String,
    },

    /// Transient: the record does not fit in the current free space.
    ///
    /// The buffer is unchanged. Retry once the consumer has drained.
    #[error("Buffer '{name}' full: record needs {needed} words, {free} free")]
    Full {
        /// Buffer name.
        name: String,
        /// Words the record needs.
        needed: usize,
        /// Words currently free.
        free: usize,
    },

    /// Permanent: the record can never fit in this buffer.
    #[error("Record of {words} words exceeds capacity of buffer '{name}' ({capacity} words)")]
    TooLarge {
        /// Buffer name.
        name: String,
        /// Record size in words.
        words: usize,
        /// Buffer capacity in words.
        capacity: usize,
    },

    /// Permanent: frame validation failed on read. The buffer is poisoned.
    #[error("Corrupt frame in buffer '{name}': {source}")]
    CorruptFrame {
        /// Buffer name.
        name: String,
        /// Frame-level violation.
        #[source]
        source: FrameError,
    },

    /// The consumer saw a corrupt frame earlier; all further reads fail.
    #[error("Buffer '{name}' is poisoned by an earlier corrupt frame")]
    Poisoned {
        /// Buffer name.
        name: String,
    },

    /// A bounded retry policy ran out of attempts.
    #[error("Retry limit of {attempts} attempts exhausted on buffer '{name}'")]
    RetryExhausted {
        /// Buffer name.
        name: String,
        /// Attempts made.
        attempts: u32,
    },

    /// Access outside the arena bounds.
    #[error("Offset {offset}+{len} words outside arena of {capacity} words")]
    OutOfBounds {
        /// Start word offset.
        offset: usize,
        /// Length in words.
        len: usize,
        /// Arena capacity in words.
        capacity: usize,
    },

    /// IO error.
    #[error("IO error: {source}")]
    Io {
        /// Source IO error.
        #[from]
        source: std::io::Error,
    },
}

/// Result type for transport operations.
pub type RingResult<T> = Result<T, RingError>;
