//! Directory-backed versioned configuration store.

use crate::error::{ConfdbError, ConfdbResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Versioned configuration store rooted at one directory.
///
/// Each entity type owns a subdirectory; each version is one immutable
/// JSON document inside it. Writes are exclusive-create: even two racing
/// processes cannot overwrite an existing version.
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Open (and create if missing) a store rooted at `root`.
    pub fn open(root: &Path) -> ConfdbResult<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All stored versions of `entity`, ascending. Empty if none.
    pub fn versions(&self, entity: &str) -> ConfdbResult<Vec<u32>> {
        let dir = self.entity_dir(entity)?;
        let mut versions = Vec::new();

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(versions),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match stem.parse::<u32>() {
                Ok(version) => versions.push(version),
                Err(_) => warn!(entity, file = ?name, "ignoring non-version file in store"),
            }
        }

        versions.sort_unstable();
        Ok(versions)
    }

    /// Latest stored version of `entity`, or `None` if there is none.
    pub fn latest(&self, entity: &str) -> ConfdbResult<Option<u32>> {
        Ok(self.versions(entity)?.last().copied())
    }

    /// Write `version` of `entity`.
    ///
    /// The existing version set is read first; a conflict is reported as
    /// [`ConfdbError::VersionExists`] and the stored record is left
    /// untouched. Exclusive file creation backs the same guarantee at the
    /// filesystem level.
    pub fn write(&self, entity: &str, version: u32, value: &serde_json::Value) -> ConfdbResult<()> {
        if self.versions(entity)?.contains(&version) {
            return Err(ConfdbError::VersionExists {
                entity: entity.to_string(),
                version,
            });
        }

        let dir = self.entity_dir(entity)?;
        std::fs::create_dir_all(&dir)?;

        let path = version_path(&dir, version);
        let mut file = match OpenOptions::new().create_new(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ConfdbError::VersionExists {
                    entity: entity.to_string(),
                    version,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let json = serde_json::to_string_pretty(value)?;
        file.write_all(json.as_bytes())?;

        info!(entity, version, "configuration version written");
        Ok(())
    }

    /// Serialize `record` and write it as `version` of `entity`.
    pub fn write_record<T: Serialize>(
        &self,
        entity: &str,
        version: u32,
        record: &T,
    ) -> ConfdbResult<()> {
        self.write(entity, version, &serde_json::to_value(record)?)
    }

    /// Read a version of `entity`; `None` selects the latest version.
    pub fn read(&self, entity: &str, version: Option<u32>) -> ConfdbResult<serde_json::Value> {
        let version = match version {
            Some(v) => v,
            None => self
                .latest(entity)?
                .ok_or_else(|| ConfdbError::NoVersions {
                    entity: entity.to_string(),
                })?,
        };

        let dir = self.entity_dir(entity)?;
        let path = version_path(&dir, version);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfdbError::NotFound {
                    entity: entity.to_string(),
                    version,
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&content)?)
    }

    /// Read and deserialize a version of `entity`.
    pub fn read_record<T: DeserializeOwned>(
        &self,
        entity: &str,
        version: Option<u32>,
    ) -> ConfdbResult<T> {
        Ok(serde_json::from_value(self.read(entity, version)?)?)
    }

    /// Remove one stored version of `entity`.
    ///
    /// Versions are immutable while stored; explicit operator removal of a
    /// whole version is the only way a version disappears.
    pub fn remove(&self, entity: &str, version: u32) -> ConfdbResult<()> {
        let dir = self.entity_dir(entity)?;
        let path = version_path(&dir, version);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(entity, version, "configuration version removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfdbError::NotFound {
                entity: entity.to_string(),
                version,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn entity_dir(&self, entity: &str) -> ConfdbResult<PathBuf> {
        if entity.is_empty()
            || entity.chars().all(|c| c == '.')
            || entity
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
        {
            return Err(ConfdbError::InvalidEntity {
                name: entity.to_string(),
            });
        }
        Ok(self.root.join(entity))
    }
}

fn version_path(dir: &Path, version: u32) -> PathBuf {
    dir.join(format!("{version}.json"))
}
