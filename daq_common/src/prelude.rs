//! Common re-exports for daqcore crates.
//!
//! ```rust
//! use daq_common::prelude::*;
//! ```

pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::consts::{CACHE_LINE_SIZE, DEFAULT_SHM_DIR, RB_MAX_WORDS, RB_MIN_WORDS, WORD_SIZE};
pub use crate::node::{NodeCommand, NodeState, NodeType};
