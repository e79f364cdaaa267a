//! Fixed crate grid of high-voltage channels.

use crate::channel::{ChannelInfo, ChannelStatus};

/// One (slot, channel) position: its configuration plus its live state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HvChannel {
    /// Operator configuration.
    pub info: ChannelInfo,
    /// Live measured state.
    pub status: ChannelStatus,
}

/// One high-voltage crate: a fixed 2-D grid of (slot, channel) pairs.
///
/// The grid is allocated once with fixed dimensions; every position owns
/// exactly one [`ChannelInfo`] and one [`ChannelStatus`] for the crate's
/// lifetime. Slot and channel indices are 0-based.
#[derive(Debug, Clone)]
pub struct HvCrate {
    id: u32,
    slots: u32,
    channels_per_slot: u32,
    grid: Vec<HvChannel>,
}

impl HvCrate {
    /// Allocate a crate with `slots` x `channels_per_slot` channels.
    pub fn new(id: u32, slots: u32, channels_per_slot: u32) -> Self {
        Self {
            id,
            slots,
            channels_per_slot,
            grid: vec![HvChannel::default(); (slots * channels_per_slot) as usize],
        }
    }

    /// Crate id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Slot count.
    pub fn slots(&self) -> u32 {
        self.slots
    }

    /// Channels per slot.
    pub fn channels_per_slot(&self) -> u32 {
        self.channels_per_slot
    }

    fn index(&self, slot: u32, channel: u32) -> Option<usize> {
        (slot < self.slots && channel < self.channels_per_slot)
            .then(|| (slot * self.channels_per_slot + channel) as usize)
    }

    /// The channel at (slot, channel), if within the grid.
    pub fn channel(&self, slot: u32, channel: u32) -> Option<&HvChannel> {
        self.index(slot, channel).map(|i| &self.grid[i])
    }

    /// The channel at (slot, channel), mutable, if within the grid.
    pub fn channel_mut(&mut self, slot: u32, channel: u32) -> Option<&mut HvChannel> {
        self.index(slot, channel).map(|i| &mut self.grid[i])
    }

    /// Iterate all (slot, channel, entry) triples in grid order.
    pub fn channels(&self) -> impl Iterator<Item = (u32, u32, &HvChannel)> {
        self.grid.iter().enumerate().map(|(i, entry)| {
            let slot = i as u32 / self.channels_per_slot;
            let channel = i as u32 % self.channels_per_slot;
            (slot, channel, entry)
        })
    }

    /// Iterate all (slot, channel, entry) triples mutably, in grid order.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = (u32, u32, &mut HvChannel)> {
        let channels_per_slot = self.channels_per_slot;
        self.grid.iter_mut().enumerate().map(move |(i, entry)| {
            let slot = i as u32 / channels_per_slot;
            let channel = i as u32 % channels_per_slot;
            (slot, channel, entry)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions_and_addressing() {
        let hv_crate = HvCrate::new(1, 4, 8);
        assert_eq!(hv_crate.id(), 1);
        assert_eq!(hv_crate.channels().count(), 32);

        assert!(hv_crate.channel(0, 0).is_some());
        assert!(hv_crate.channel(3, 7).is_some());
        // Out-of-range lookups return None, not a sentinel.
        assert!(hv_crate.channel(4, 0).is_none());
        assert!(hv_crate.channel(0, 8).is_none());
    }

    #[test]
    fn channel_mutation_is_isolated() {
        let mut hv_crate = HvCrate::new(1, 2, 2);
        hv_crate.channel_mut(1, 0).unwrap().info.nominal_voltage = 1200.0;

        for (slot, channel, entry) in hv_crate.channels() {
            let expect = if (slot, channel) == (1, 0) { 1200.0 } else { 0.0 };
            assert_eq!(entry.info.nominal_voltage, expect);
        }
    }

    #[test]
    fn iteration_order_is_slot_major() {
        let hv_crate = HvCrate::new(1, 2, 3);
        let order: Vec<(u32, u32)> = hv_crate.channels().map(|(s, c, _)| (s, c)).collect();
        assert_eq!(
            order,
            [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }
}
