//! Versioned save/recall of crate grids.
//!
//! Info and Status are written through independent serialization passes
//! into separate store entities (`hv.info.<crate>` / `hv.status.<crate>`),
//! so their on-disk representations can evolve independently.

use crate::channel::{ChannelInfo, ChannelStatus};
use crate::error::{HvError, HvResult};
use crate::hvcrate::HvCrate;
use daq_confdb::{ConfdbError, ConfigStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Persisted form of one crate's configuration grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoSnapshot {
    /// Crate id.
    pub crate_id: u32,
    /// Slot count at save time.
    pub slots: u32,
    /// Channels per slot at save time.
    pub channels_per_slot: u32,
    /// Channel configuration in grid order (slot-major).
    pub infos: Vec<ChannelInfo>,
}

/// Persisted form of one crate's live-state grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Crate id.
    pub crate_id: u32,
    /// Slot count at save time.
    pub slots: u32,
    /// Channels per slot at save time.
    pub channels_per_slot: u32,
    /// Channel state in grid order (slot-major).
    pub statuses: Vec<ChannelStatus>,
}

fn info_entity(crate_id: u32) -> String {
    format!("hv.info.{crate_id}")
}

fn status_entity(crate_id: u32) -> String {
    format!("hv.status.{crate_id}")
}

/// Save all crates as `version`: one Info pass, then one Status pass.
pub fn save_crates(store: &ConfigStore, crates: &[HvCrate], version: u32) -> HvResult<()> {
    for hv_crate in crates {
        let snapshot = InfoSnapshot {
            crate_id: hv_crate.id(),
            slots: hv_crate.slots(),
            channels_per_slot: hv_crate.channels_per_slot(),
            infos: hv_crate.channels().map(|(_, _, entry)| entry.info).collect(),
        };
        store.write_record(&info_entity(hv_crate.id()), version, &snapshot)?;
    }

    for hv_crate in crates {
        let snapshot = StatusSnapshot {
            crate_id: hv_crate.id(),
            slots: hv_crate.slots(),
            channels_per_slot: hv_crate.channels_per_slot(),
            statuses: hv_crate
                .channels()
                .map(|(_, _, entry)| entry.status)
                .collect(),
        };
        store.write_record(&status_entity(hv_crate.id()), version, &snapshot)?;
    }

    info!(version, crates = crates.len(), "HV configuration saved");
    Ok(())
}

/// Recall `version` into all crates: one Info pass, then one Status pass.
pub fn recall_crates(store: &ConfigStore, crates: &mut [HvCrate], version: u32) -> HvResult<()> {
    // Validate both passes against the live topology before mutating
    // anything, so a bad snapshot cannot leave the grids half-recalled.
    let mut info_snapshots = Vec::with_capacity(crates.len());
    let mut status_snapshots = Vec::with_capacity(crates.len());
    for hv_crate in crates.iter() {
        let info_snapshot: InfoSnapshot =
            read_version(store, &info_entity(hv_crate.id()), version)?;
        let status_snapshot: StatusSnapshot =
            read_version(store, &status_entity(hv_crate.id()), version)?;

        let dims_ok = |slots: u32, channels: u32, len: usize| {
            slots == hv_crate.slots()
                && channels == hv_crate.channels_per_slot()
                && len == (slots * channels) as usize
        };
        if !dims_ok(
            info_snapshot.slots,
            info_snapshot.channels_per_slot,
            info_snapshot.infos.len(),
        ) || !dims_ok(
            status_snapshot.slots,
            status_snapshot.channels_per_slot,
            status_snapshot.statuses.len(),
        ) {
            return Err(HvError::TopologyMismatch {
                crate_id: hv_crate.id(),
                slots: hv_crate.slots(),
                channels: hv_crate.channels_per_slot(),
            });
        }
        info_snapshots.push(info_snapshot);
        status_snapshots.push(status_snapshot);
    }

    for (hv_crate, snapshot) in crates.iter_mut().zip(&info_snapshots) {
        for (i, (_, _, entry)) in hv_crate.channels_mut().enumerate() {
            entry.info = snapshot.infos[i];
        }
    }
    for (hv_crate, snapshot) in crates.iter_mut().zip(&status_snapshots) {
        for (i, (_, _, entry)) in hv_crate.channels_mut().enumerate() {
            entry.status = snapshot.statuses[i];
        }
    }

    info!(version, crates = crates.len(), "HV configuration recalled");
    Ok(())
}

/// All versions saved for any configured crate, ascending and deduplicated.
pub fn saved_versions(store: &ConfigStore, crates: &[HvCrate]) -> HvResult<Vec<u32>> {
    let mut versions = Vec::new();
    for hv_crate in crates {
        versions.extend(store.versions(&info_entity(hv_crate.id()))?);
    }
    versions.sort_unstable();
    versions.dedup();
    Ok(versions)
}

/// Remove `version` for all crates; returns how many entities dropped it.
pub fn remove_version(store: &ConfigStore, crates: &[HvCrate], version: u32) -> HvResult<usize> {
    let mut removed = 0;
    for hv_crate in crates {
        for entity in [info_entity(hv_crate.id()), status_entity(hv_crate.id())] {
            match store.remove(&entity, version) {
                Ok(()) => removed += 1,
                // A crate configured after this version was saved simply
                // has nothing to drop.
                Err(ConfdbError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(removed)
}

fn read_version<T: serde::de::DeserializeOwned>(
    store: &ConfigStore,
    entity: &str,
    version: u32,
) -> HvResult<T> {
    store
        .read_record(entity, Some(version))
        .map_err(|e| match e {
            ConfdbError::NotFound { .. } | ConfdbError::NoVersions { .. } => {
                HvError::NoSuchVersion { version }
            }
            other => other.into(),
        })
}
