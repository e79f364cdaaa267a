//! # daqcore High-Voltage Control
//!
//! Applies textual verbs uniformly across a crate → slot → channel
//! hierarchy of high-voltage channels.
//!
//! A command addresses a range of channels with `<crate>.<slot>.<channel>`
//! where any segment may be `*` ("all"). The verb resolves to one handler,
//! and the same handler runs on every matched channel; the overall result
//! is success only if every matched channel succeeded, but one channel's
//! failure never stops the remaining channels.
//!
//! # Module Structure
//!
//! - [`channel`] - `ChannelInfo` (operator configuration) and
//!   `ChannelStatus` (live measured state)
//! - [`address`] - wildcard channel addressing
//! - [`hvcrate`] - fixed crate grid of (slot, channel) pairs
//! - [`master`] - verb parsing and uniform dispatch
//! - [`snapshot`] - versioned save/recall of the Info and Status grids
//! - [`config`] - crate topology configuration
//!
//! ```text
//! ┌───────────────┐   set *.2.3 voltage=1500   ┌───────────────────────┐
//! │ daq_hv binary ├───────────────────────────►│ HvControlMaster       │
//! └───────────────┘                            │  ├─ HvCrate 1 (4x8)   │
//!                                              │  └─ HvCrate 2 (4x8)   │
//!                                              └──────────┬────────────┘
//!                                                         ▼
//!                                              ┌───────────────────────┐
//!                                              │ ConfigStore (save /   │
//!                                              │ recall, versioned)    │
//!                                              └───────────────────────┘
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod channel;
pub mod config;
pub mod error;
pub mod hvcrate;
pub mod master;
pub mod snapshot;

pub use address::{ChannelAddress, Segment};
pub use channel::{ChannelInfo, ChannelStatus, StatusFlags};
pub use config::{CrateTopology, HvConfig};
pub use error::{HvError, HvResult};
pub use hvcrate::{HvChannel, HvCrate};
pub use master::{HvCommand, HvControlMaster, Outcome};
