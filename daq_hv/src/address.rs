//! Wildcard channel addressing.
//!
//! Channels are addressed as `"<crate>.<slot>.<channel>"`. Any segment may
//! be `*`, meaning "all" at that level: `"1.2.3"` is a single channel,
//! `"1.*.*"` a whole crate, `"*.*.*"` every channel of every crate.

use crate::error::{HvError, HvResult};
use std::str::FromStr;

/// One address segment: an explicit index or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Match every index at this level.
    All,
    /// Match exactly this index.
    Index(u32),
}

impl Segment {
    /// Whether `value` is matched by this segment.
    pub fn matches(self, value: u32) -> bool {
        match self {
            Self::All => true,
            Self::Index(index) => index == value,
        }
    }

    fn parse(text: &str, full: &str) -> HvResult<Self> {
        if text == "*" {
            return Ok(Self::All);
        }
        text.parse()
            .map(Self::Index)
            .map_err(|_| HvError::BadAddress {
                text: full.to_string(),
                reason: format!("segment '{text}' is neither an index nor '*'"),
            })
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A parsed `<crate>.<slot>.<channel>` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAddress {
    /// Crate id segment.
    pub crate_id: Segment,
    /// Slot index segment.
    pub slot: Segment,
    /// Channel index segment.
    pub channel: Segment,
}

impl FromStr for ChannelAddress {
    type Err = HvError;

    fn from_str(s: &str) -> HvResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let [crate_part, slot_part, channel_part] = parts.as_slice() else {
            return Err(HvError::BadAddress {
                text: s.to_string(),
                reason: "expected three '.'-separated segments".to_string(),
            });
        };

        Ok(Self {
            crate_id: Segment::parse(crate_part, s)?,
            slot: Segment::parse(slot_part, s)?,
            channel: Segment::parse(channel_part, s)?,
        })
    }
}

impl std::fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.crate_id, self.slot, self.channel)
    }
}
