//! # daqcore Configuration Store
//!
//! Versioned persistence for node and crate configuration. Every write
//! creates a new immutable version; old versions are retained for audit
//! and rollback. A version that exists is never overwritten - conflicting
//! writes are reported to the operator.
//!
//! Storage layout is one JSON document per version:
//!
//! ```text
//! <root>/<entity>/<version>.json
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use daq_confdb::ConfigStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), daq_confdb::ConfdbError> {
//! let store = ConfigStore::open(Path::new("/var/lib/daq/conf"))?;
//! store.write("HVconfig", 3, &serde_json::json!({"crate": 1}))?;
//!
//! // Latest version when none is given.
//! let latest = store.read("HVconfig", None)?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod store;

pub use error::{ConfdbError, ConfdbResult};
pub use store::ConfigStore;
