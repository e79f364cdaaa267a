//! Fixed-size shared-memory arena with bounds-checked word access.
//!
//! An arena is one mapped segment file: a small typed header (owned by the
//! segment kind layered on top - ring buffer or run-info) followed by a
//! data section addressed in 32-bit words. All data access goes through
//! offset-checked copies; record framing is decoded from plain word slices,
//! never through raw pointer casts into the mapping.

use crate::error::{RingError, RingResult};
use crate::platform::{
    attach_segment_file, create_segment_file, map_attach_err, map_create_err, unlink_segment_file,
};
use daq::consts::WORD_SIZE;
use memmap2::MmapMut;
use std::path::{Path, PathBuf};

/// A named, fixed-size shared-memory arena.
///
/// Created exclusively by one owning process (`create`) and mapped by peer
/// processes (`attach`). The owner unlinks the backing file on drop; the
/// arena capacity never changes after creation.
pub struct ShmArena {
    name: String,
    path: PathBuf,
    mmap: MmapMut,
    header_len: usize,
    data_words: usize,
    owner: bool,
}

impl ShmArena {
    /// Create a new arena of `data_words` words behind a `header_len`-byte
    /// header. Fails if the segment file already exists.
    pub fn create(
        dir: &Path,
        name: &str,
        file_name: &str,
        header_len: usize,
        data_words: usize,
    ) -> RingResult<Self> {
        let path = dir.join(file_name);
        let total = header_len + data_words * WORD_SIZE;

        let mmap = create_segment_file(&path, total).map_err(|e| map_create_err(e, name))?;

        Ok(Self {
            name: name.to_string(),
            path,
            mmap,
            header_len,
            data_words,
            owner: true,
        })
    }

    /// Attach to an existing arena. The data capacity is derived from the
    /// segment file length; header validation is the caller's job.
    pub fn attach(dir: &Path, name: &str, file_name: &str, header_len: usize) -> RingResult<Self> {
        let path = dir.join(file_name);

        let (mmap, total) = attach_segment_file(&path).map_err(|e| map_attach_err(e, name))?;

        if total < header_len || (total - header_len) % WORD_SIZE != 0 {
            return Err(RingError::BadSegment {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            path,
            mmap,
            header_len,
            data_words: (total - header_len) / WORD_SIZE,
            owner: false,
        })
    }

    /// Arena name (for diagnostics).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data capacity in words.
    pub fn data_words(&self) -> usize {
        self.data_words
    }

    /// Whether this handle owns (and will unlink) the segment.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Header section pointer for typed header access.
    pub fn header_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    /// Mutable header section pointer (owner initialization only).
    pub fn header_ptr_mut(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    /// Copy `out.len()` words starting at word `offset` out of the arena.
    pub fn read_words(&self, offset: usize, out: &mut [u32]) -> RingResult<()> {
        self.check_range(offset, out.len())?;
        unsafe {
            let src = (self.mmap.as_ptr().add(self.header_len) as *const u32).add(offset);
            std::ptr::copy_nonoverlapping(src, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }

    /// Read the single word at `offset`.
    pub fn read_word(&self, offset: usize) -> RingResult<u32> {
        let mut word = [0u32];
        self.read_words(offset, &mut word)?;
        Ok(word[0])
    }

    /// Copy `words` into the arena starting at word `offset`.
    pub fn write_words(&mut self, offset: usize, words: &[u32]) -> RingResult<()> {
        self.check_range(offset, words.len())?;
        unsafe {
            let dst = (self.mmap.as_mut_ptr().add(self.header_len) as *mut u32).add(offset);
            std::ptr::copy_nonoverlapping(words.as_ptr(), dst, words.len());
        }
        Ok(())
    }

    fn check_range(&self, offset: usize, len: usize) -> RingResult<()> {
        if offset.checked_add(len).is_none_or(|end| end > self.data_words) {
            return Err(RingError::OutOfBounds {
                offset,
                len,
                capacity: self.data_words,
            });
        }
        Ok(())
    }
}

impl Drop for ShmArena {
    fn drop(&mut self) {
        if self.owner {
            unlink_segment_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut arena = ShmArena::create(dir.path(), "t", "t.seg", 64, 256).unwrap();

        arena.write_words(10, &[7, 8, 9]).unwrap();

        let mut out = [0u32; 3];
        arena.read_words(10, &mut out).unwrap();
        assert_eq!(out, [7, 8, 9]);
        assert_eq!(arena.read_word(11).unwrap(), 8);
    }

    #[test]
    fn bounds_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let mut arena = ShmArena::create(dir.path(), "t", "t.seg", 64, 16).unwrap();

        assert!(matches!(
            arena.write_words(15, &[1, 2]),
            Err(RingError::OutOfBounds { .. })
        ));
        let mut out = [0u32; 1];
        assert!(matches!(
            arena.read_words(16, &mut out),
            Err(RingError::OutOfBounds { .. })
        ));
        // usize overflow in offset+len must not wrap around.
        assert!(matches!(
            arena.read_words(usize::MAX, &mut out),
            Err(RingError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn attach_sees_owner_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut owner = ShmArena::create(dir.path(), "t", "t.seg", 64, 128).unwrap();
        owner.write_words(0, &[0xDEAD_BEEF]).unwrap();

        let peer = ShmArena::attach(dir.path(), "t", "t.seg", 64).unwrap();
        assert_eq!(peer.data_words(), 128);
        assert!(!peer.is_owner());
        assert_eq!(peer.read_word(0).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn owner_unlinks_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _arena = ShmArena::create(dir.path(), "t", "t.seg", 64, 16).unwrap();
            assert!(dir.path().join("t.seg").exists());
        }
        assert!(!dir.path().join("t.seg").exists());
    }

    #[test]
    fn attach_missing_segment() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ShmArena::attach(dir.path(), "t", "t.seg", 64),
            Err(RingError::NotFound { .. })
        ));
    }
}
