//! daqcore Common Library
//!
//! This crate provides shared constants, node state definitions and
//! configuration loading utilities for all daqcore workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Transport and layout constants
//! - [`node`] - Node lifecycle states, command verbs and node types
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! daq = { package = "daq_common", path = "../daq_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use daq_common::consts::*;
//! use daq_common::node::{NodeCommand, NodeState};
//! ```

pub mod config;
pub mod consts;
pub mod node;
pub mod prelude;
