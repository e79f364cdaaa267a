//! Linux-specific shared memory file operations.
//!
//! Segments are plain files under a tmpfs directory (default `/dev/shm`),
//! created exclusively by the owning process and mapped read-write by
//! peers. Keeping the directory configurable lets tests run against a
//! `tempfile` directory instead of the system shm mount.

use crate::error::{RingError, RingResult};
use memmap2::{MmapMut, MmapOptions};
use nix::unistd::getpid;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Create a new segment file of exactly `len` bytes and map it.
///
/// Fails with `ErrorKind::AlreadyExists` if the file is present; exclusive
/// creation is how single ownership of a segment is enforced.
pub fn create_segment_file(path: &Path, len: usize) -> RingResult<MmapMut> {
    let file = OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .mode(0o600) // Owner read/write only
        .open(path)?;

    file.set_len(len as u64)?;

    let mmap = unsafe { MmapOptions::new().populate().map_mut(&file)? };
    Ok(mmap)
}

/// Map an existing segment file read-write, returning the mapping and its
/// byte length.
pub fn attach_segment_file(path: &Path) -> RingResult<(MmapMut, usize)> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    let len = file.metadata()?.len() as usize;

    let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
    Ok((mmap, len))
}

/// Remove a segment file, ignoring a missing file.
pub fn unlink_segment_file(path: &Path) {
    let _ = std::fs::remove_file(path);
}

/// Get current process ID.
pub fn current_pid() -> u32 {
    getpid().as_raw() as u32
}

/// Map an `AlreadyExists` IO error to the typed segment error.
pub(crate) fn map_create_err(err: RingError, name: &str) -> RingError {
    match err {
        RingError::Io { source } if source.kind() == std::io::ErrorKind::AlreadyExists => {
            RingError::AlreadyExists {
                name: name.to_string(),
            }
        }
        other => other,
    }
}

/// Map a `NotFound` IO error to the typed segment error.
pub(crate) fn map_attach_err(err: RingError, name: &str) -> RingError {
    match err {
        RingError::Io { source } if source.kind() == std::io::ErrorKind::NotFound => {
            RingError::NotFound {
                name: name.to_string(),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg");

        let _mmap = create_segment_file(&path, 4096).unwrap();
        let second = create_segment_file(&path, 4096);
        assert!(matches!(
            second,
            Err(RingError::Io { source }) if source.kind() == std::io::ErrorKind::AlreadyExists
        ));
    }

    #[test]
    fn attach_reports_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg");

        create_segment_file(&path, 8192).unwrap();
        let (_mmap, len) = attach_segment_file(&path).unwrap();
        assert_eq!(len, 8192);
    }

    #[test]
    fn pid_is_nonzero() {
        assert!(current_pid() > 0);
    }
}
