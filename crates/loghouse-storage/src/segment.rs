//! Segment: one store file paired with one index file.
//!
//! A segment owns a contiguous offset range starting at its base offset.
//! Both files are named for the base offset — `<base>.store` and
//! `<base>.index` — which is how the log rediscovers segments on open.
//! `next_offset` is recovered from the last index entry: an index with N
//! live entries means offsets `base..base + N` are present.
//!
//! Append writes the store entry first, then the index entry. A failed
//! index write leaves an orphan record in the store and `next_offset`
//! unchanged; the orphan is unreachable (the index bounds what exists)
//! and the region past the last indexed record is treated as scratch.
//!
//! `is_maxed` is a post-condition check: a single append may push the
//! store past `max_store_bytes`, and it is the log's job to roll over
//! before the next append.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use loghouse_core::{Record, RecordCodec};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{Index, ENTRY_WIDTH};
use crate::store::Store;

pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: Config,
    codec: Arc<dyn RecordCodec>,
}

impl Segment {
    /// Open or create the segment with the given base offset inside
    /// `dir`, recovering `next_offset` from the index.
    pub fn open(
        dir: &Path,
        base_offset: u64,
        config: Config,
        codec: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(
            dir.join(format!("{base_offset}.index")),
            config.segment.max_index_bytes,
        )?;

        let next_offset = match index.last_entry() {
            Some((relative_offset, _)) => base_offset + u64::from(relative_offset) + 1,
            None => base_offset,
        };
        debug!(base_offset, next_offset, "segment opened");

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
            codec,
        })
    }

    /// Append a record, returning its absolute offset.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let offset = self.next_offset;
        let stamped = Record {
            value: record.value.clone(),
            offset,
        };

        let payload = self.codec.encode(&stamped)?;
        let (_, position) = self.store.append(&payload)?;
        self.index
            .write((offset - self.base_offset) as u32, position)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at an absolute offset.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let (_, position) = offset
            .checked_sub(self.base_offset)
            .and_then(|relative| self.index.entry(relative))
            .ok_or(Error::OffsetOutOfRange { offset })?;

        let payload = self.store.read(position)?;
        let mut record = self.codec.decode(&payload)?;
        record.offset = offset;
        Ok(record)
    }

    /// Whether either file has reached its configured cap.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.segment.max_store_bytes
            || self.index.size() + ENTRY_WIDTH > self.config.segment.max_index_bytes
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Offset the next append will receive.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn is_empty(&self) -> bool {
        self.next_offset == self.base_offset
    }

    /// Shared handle to the store for bulk streaming.
    pub(crate) fn store_handle(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Push buffered store bytes and mapped index entries to the OS.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()?;
        self.index.flush()?;
        Ok(())
    }

    /// Close both files; the index right-sizes itself on the way down.
    pub fn close(self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close the segment and delete its file pair.
    pub fn remove(self) -> Result<()> {
        let store_path = self.store.path().to_path_buf();
        let index_path = self.index.path().to_path_buf();
        debug!(base_offset = self.base_offset, "removing segment files");

        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("base_offset", &self.base_offset)
            .field("next_offset", &self.next_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use loghouse_core::PayloadCodec;
    use tempfile::TempDir;

    const VALUE: &[u8] = b"hello world";

    fn codec() -> Arc<dyn RecordCodec> {
        Arc::new(PayloadCodec)
    }

    fn config(max_store_bytes: u64, max_index_bytes: u64) -> Config {
        Config {
            segment: SegmentConfig {
                max_store_bytes,
                max_index_bytes,
                initial_offset: 0,
            },
        }
    }

    #[test]
    fn test_append_read_until_index_full() {
        let dir = TempDir::new().unwrap();
        let config = config(1024, ENTRY_WIDTH * 3);

        let mut segment = Segment::open(dir.path(), 16, config, codec()).unwrap();
        assert_eq!(segment.next_offset(), 16);
        assert!(!segment.is_maxed());

        let record = Record::new(VALUE);
        for i in 0..3 {
            let offset = segment.append(&record).unwrap();
            assert_eq!(offset, 16 + i);

            let got = segment.read(offset).unwrap();
            assert_eq!(got.value, record.value);
            assert_eq!(got.offset, offset);
        }

        let err = segment.append(&record).unwrap_err();
        assert!(matches!(err, Error::IndexFull));
        assert!(segment.is_maxed());
        // The refused append must not burn an offset.
        assert_eq!(segment.next_offset(), 19);
        segment.close().unwrap();
    }

    #[test]
    fn test_reopen_recovers_next_offset_and_maxed_store() {
        let dir = TempDir::new().unwrap();

        let mut segment = Segment::open(dir.path(), 16, config(1024, 1024), codec()).unwrap();
        let record = Record::new(VALUE);
        for _ in 0..3 {
            segment.append(&record).unwrap();
        }
        segment.close().unwrap();

        // Reopen with a store cap the existing data already exceeds.
        let tight = config(3 * VALUE.len() as u64, 1024);
        let segment = Segment::open(dir.path(), 16, tight, codec()).unwrap();
        assert_eq!(segment.next_offset(), 19);
        assert!(segment.is_maxed());

        segment.remove().unwrap();
        let segment = Segment::open(dir.path(), 16, tight, codec()).unwrap();
        assert!(!segment.is_maxed());
        assert!(segment.is_empty());
        segment.close().unwrap();
    }

    #[test]
    fn test_read_outside_segment_fails() {
        let dir = TempDir::new().unwrap();
        let mut segment = Segment::open(dir.path(), 16, config(1024, 1024), codec()).unwrap();
        segment.append(&Record::new(VALUE)).unwrap();

        // Below the base and past the tail both miss.
        assert!(matches!(
            segment.read(15).unwrap_err(),
            Error::OffsetOutOfRange { offset: 15 }
        ));
        assert!(matches!(
            segment.read(17).unwrap_err(),
            Error::OffsetOutOfRange { offset: 17 }
        ));
        segment.close().unwrap();
    }
}
