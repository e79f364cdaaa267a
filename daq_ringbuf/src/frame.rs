//! Framed record codec.
//!
//! Wire layout, word-addressed (32-bit words):
//!
//! ```text
//! w[0]        total word count, including this word and the trailer
//! w[1]        experiment number
//! w[2]        run number
//! w[3]        sub-run number
//! w[4]        event number
//! w[5]        originating node id
//! w[6]        body word count
//! w[7..7+b]   payload words
//! w[total-1]  trailer marker (TRAILER_MAGIC)
//! ```
//!
//! The declared word count must equal the number of words the reader
//! consumes; any disagreement, and any trailer mismatch, is a fatal
//! protocol violation for the buffer the frame came from.

use crate::error::FrameError;
use serde::{Deserialize, Serialize};

/// Words in the fixed frame header (length word included).
pub const FRAME_HEADER_WORDS: usize = 7;

/// Words in the closing trailer.
pub const FRAME_TRAILER_WORDS: usize = 1;

/// Fixed per-record overhead: header plus trailer.
pub const FRAME_OVERHEAD_WORDS: usize = FRAME_HEADER_WORDS + FRAME_TRAILER_WORDS;

/// Closing marker written as the last word of every frame.
pub const TRAILER_MAGIC: u32 = 0x7FFF_0007;

/// Run-identification header carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Experiment number.
    pub exp: u32,
    /// Run number.
    pub run: u32,
    /// Sub-run number.
    pub subrun: u32,
    /// Event number.
    pub event: u32,
    /// Originating node id.
    pub node: u32,
}

/// One framed event record: header metadata plus payload words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Run-identification metadata.
    pub header: RecordHeader,
    /// Payload words.
    pub payload: Vec<u32>,
}

impl Record {
    /// Build a record from header and payload.
    pub fn new(header: RecordHeader, payload: Vec<u32>) -> Self {
        Self { header, payload }
    }

    /// Total frame length in words, including length word and trailer.
    pub fn total_words(&self) -> usize {
        FRAME_OVERHEAD_WORDS + self.payload.len()
    }

    /// Encode the frame into `out`, replacing its contents. After the call
    /// `out.len()` equals [`total_words`](Self::total_words).
    pub fn encode_to(&self, out: &mut Vec<u32>) {
        out.clear();
        out.reserve(self.total_words());
        out.push(self.total_words() as u32);
        out.push(self.header.exp);
        out.push(self.header.run);
        out.push(self.header.subrun);
        out.push(self.header.event);
        out.push(self.header.node);
        out.push(self.payload.len() as u32);
        out.extend_from_slice(&self.payload);
        out.push(TRAILER_MAGIC);
    }

    /// Encode the frame into a fresh word vector.
    pub fn encode(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }

    /// Decode one frame from `words`, which must hold exactly the frame.
    ///
    /// Validates the declared length against the words consumed, the body
    /// count against the declared total, and the trailer marker.
    pub fn decode(words: &[u32]) -> Result<Self, FrameError> {
        if words.len() < FRAME_OVERHEAD_WORDS {
            return Err(FrameError::DeclaredTooShort {
                declared: words.first().copied().unwrap_or(0),
                min: FRAME_OVERHEAD_WORDS as u32,
            });
        }

        let declared = words[0];
        if (declared as usize) < FRAME_OVERHEAD_WORDS {
            return Err(FrameError::DeclaredTooShort {
                declared,
                min: FRAME_OVERHEAD_WORDS as u32,
            });
        }
        if declared as usize != words.len() {
            return Err(FrameError::LengthMismatch {
                declared,
                available: words.len() as u32,
            });
        }

        let body = words[6];
        if body as usize != declared as usize - FRAME_OVERHEAD_WORDS {
            return Err(FrameError::BodyMismatch { declared, body });
        }

        let trailer = words[declared as usize - 1];
        if trailer != TRAILER_MAGIC {
            return Err(FrameError::BadTrailer { found: trailer });
        }

        Ok(Self {
            header: RecordHeader {
                exp: words[1],
                run: words[2],
                subrun: words[3],
                event: words[4],
                node: words[5],
            },
            payload: words[FRAME_HEADER_WORDS..FRAME_HEADER_WORDS + body as usize].to_vec(),
        })
    }
}
