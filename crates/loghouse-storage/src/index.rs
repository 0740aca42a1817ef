//! Memory-mapped offset index.
//!
//! The index maps a record's relative offset (absolute offset minus the
//! segment's base) to the byte position of its entry in the store.
//! Entries are fixed-width and dense — entry N belongs to the N-th record
//! in the segment:
//!
//! ```text
//! ┌───────────────────────────┬────────────────────────┐
//! │ Relative offset (u32, BE) │ Store position (u64, BE) │
//! └───────────────────────────┴────────────────────────┘
//! 12 bytes per entry
//! ```
//!
//! The file is grown to its configured maximum up front and mapped
//! read-write once, so appends never remap. A logical `used` cursor
//! separates live entries from the uninitialized tail. On close the file
//! is truncated back down to `used`; the next open reads the file size
//! before re-growing it and recovers the cursor from there. Skipping the
//! close-time truncation would make the next open see a full index.
//!
//! The mapping is owned by the index and must not be touched after
//! `close`; `close` consumes the index, flushes and drops the map, and
//! only then resizes the file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::{Error, Result};

pub(crate) const OFF_WIDTH: u64 = 4;
pub(crate) const POS_WIDTH: u64 = 8;
/// Bytes per index entry.
pub(crate) const ENTRY_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

pub struct Index {
    file: File,
    mmap: MmapMut,
    /// Byte length of the live region; always a multiple of `ENTRY_WIDTH`.
    used: u64,
    path: PathBuf,
}

impl Index {
    /// Open or create the index at `path`, growing the file to
    /// `max_bytes` and mapping it. The logical cursor is the file's size
    /// before the grow, which a clean `close` left equal to the live
    /// entry bytes.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let used = file.metadata()?.len();
        file.set_len(max_bytes)?;

        // SAFETY: the index owns both the file and the mapping; the file
        // is not resized again until `close`, which drops the mapping
        // first. The directory is exclusive to one log instance.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            mmap,
            used,
            path,
        })
    }

    /// Append an entry. Fails with [`Error::IndexFull`] when the mapping
    /// has no room for another entry.
    pub fn write(&mut self, relative_offset: u32, position: u64) -> Result<()> {
        if self.used + ENTRY_WIDTH > self.mmap.len() as u64 {
            return Err(Error::IndexFull);
        }

        let at = self.used as usize;
        self.mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&relative_offset.to_be_bytes());
        self.mmap[at + OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&position.to_be_bytes());
        self.used += ENTRY_WIDTH;
        Ok(())
    }

    /// Entry `n`, or `None` past the live region.
    pub fn entry(&self, n: u64) -> Option<(u32, u64)> {
        let at = n.checked_mul(ENTRY_WIDTH)?;
        let end = at.checked_add(ENTRY_WIDTH)?;
        if end > self.used || end > self.mmap.len() as u64 {
            return None;
        }

        let at = at as usize;
        let relative_offset = u32::from_be_bytes(
            self.mmap[at..at + OFF_WIDTH as usize].try_into().unwrap(),
        );
        let position = u64::from_be_bytes(
            self.mmap[at + OFF_WIDTH as usize..at + ENTRY_WIDTH as usize]
                .try_into()
                .unwrap(),
        );
        Some((relative_offset, position))
    }

    /// The highest live entry, if any.
    pub fn last_entry(&self) -> Option<(u32, u64)> {
        (self.used / ENTRY_WIDTH).checked_sub(1).and_then(|n| self.entry(n))
    }

    /// Byte length of the live region.
    pub fn size(&self) -> u64 {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush mapped entries to the OS.
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Flush the mapping, release it, and truncate the file to the live
    /// entry bytes so the next open recovers the cursor from the size.
    pub fn close(self) -> Result<()> {
        let Index {
            file,
            mmap,
            used,
            path: _,
        } = self;

        mmap.flush()?;
        // The file must not be resized while mapped.
        drop(mmap);

        file.set_len(used)?;
        file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("path", &self.path)
            .field("used", &self.used)
            .field("capacity", &self.mmap.len())
            .finish()
    }
}
