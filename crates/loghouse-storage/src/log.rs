//! The log: an ordered collection of segments with one active tail.
//!
//! The log routes appends to the active (last) segment and rolls over to
//! a fresh segment once the active one is maxed. Reads binary-search the
//! segment list for the owner of the requested offset. Segments partition
//! the offset space with no gaps: each segment's base offset equals its
//! predecessor's next offset.
//!
//! On open the directory is scanned for `<base>.store` / `<base>.index`
//! pairs; the base offsets (deduplicated across the two suffixes, stray
//! files ignored) become the segment list, sorted ascending. An empty
//! directory gets one segment at the configured initial offset.
//!
//! One read-write lock guards the segment list: appends, rollover,
//! truncation, and flush take it exclusively; reads share it. Store and
//! index locks nest strictly inside it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use loghouse_core::{PayloadCodec, Record, RecordCodec};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reader::LogReader;
use crate::segment::Segment;

pub struct Log {
    dir: PathBuf,
    config: Config,
    codec: Arc<dyn RecordCodec>,
    /// Sorted by base offset; the last segment is the active one. Never
    /// empty.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open or create a log in `dir` with the default payload codec.
    pub fn open(dir: impl Into<PathBuf>, config: Config) -> Result<Self> {
        Self::with_codec(dir, config, Arc::new(PayloadCodec))
    }

    /// Open or create a log in `dir`, recovering any segments already on
    /// disk. Zero caps in `config` are replaced with defaults.
    pub fn with_codec(
        dir: impl Into<PathBuf>,
        config: Config,
        codec: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let dir = dir.into();
        let config = config.normalized();
        fs::create_dir_all(&dir)?;

        let mut segments = Vec::new();
        for base_offset in discover_base_offsets(&dir)? {
            segments.push(Segment::open(&dir, base_offset, config, codec.clone())?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                &dir,
                config.segment.initial_offset,
                config,
                codec.clone(),
            )?);
        }

        let active = segments.last().expect("log always has an active segment");
        info!(
            dir = %dir.display(),
            segments = segments.len(),
            next_offset = active.next_offset(),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            codec,
            segments: RwLock::new(segments),
        })
    }

    /// Append a record, returning the offset it was assigned. Rolls over
    /// to a new segment when the active one fills.
    pub fn append(&self, record: &Record) -> Result<u64> {
        let mut segments = self.segments.write().unwrap();
        let active = segments
            .last_mut()
            .expect("log always has an active segment");
        let offset = active.append(record)?;

        if active.is_maxed() {
            let base_offset = active.next_offset();
            debug!(base_offset, "active segment maxed, rolling over");
            let segment = Segment::open(&self.dir, base_offset, self.config, self.codec.clone())?;
            segments.push(segment);
        }
        Ok(offset)
    }

    /// Read the record at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read().unwrap();
        // Last segment whose base offset does not exceed the target.
        let candidate = segments.partition_point(|s| s.base_offset() <= offset);
        let segment = candidate
            .checked_sub(1)
            .map(|i| &segments[i])
            .filter(|s| offset < s.next_offset())
            .ok_or(Error::OffsetOutOfRange { offset })?;
        segment.read(offset)
    }

    /// The lowest readable offset.
    pub fn lowest_offset(&self) -> u64 {
        let segments = self.segments.read().unwrap();
        segments
            .first()
            .expect("log always has an active segment")
            .base_offset()
    }

    /// The highest assigned offset. Returns 0 for a log whose next offset
    /// is 0; emptiness is observable through failing reads.
    pub fn highest_offset(&self) -> u64 {
        let segments = self.segments.read().unwrap();
        let next_offset = segments
            .last()
            .expect("log always has an active segment")
            .next_offset();
        next_offset.saturating_sub(1)
    }

    /// Remove every segment whose highest offset is at or below `lowest`,
    /// deleting their files. If that would leave no segments, a fresh one
    /// is created at the old active segment's next offset so appends
    /// continue without reusing offsets.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write().unwrap();
        let next_offset = segments
            .last()
            .expect("log always has an active segment")
            .next_offset();

        let mut kept = Vec::with_capacity(segments.len());
        for segment in segments.drain(..) {
            if segment.next_offset() <= lowest.saturating_add(1) {
                info!(
                    base_offset = segment.base_offset(),
                    lowest, "truncating segment"
                );
                segment.remove()?;
            } else {
                kept.push(segment);
            }
        }
        if kept.is_empty() {
            kept.push(Segment::open(
                &self.dir,
                next_offset,
                self.config,
                self.codec.clone(),
            )?);
        }
        *segments = kept;
        Ok(())
    }

    /// Stream the raw store bytes of every segment, in base-offset order.
    /// The stream is a snapshot of the segment list at call time; restart
    /// it by calling `reader()` again.
    pub fn reader(&self) -> LogReader {
        let segments = self.segments.read().unwrap();
        LogReader::new(segments.iter().map(|s| s.store_handle()).collect())
    }

    /// Push all buffered store bytes and index entries to the OS.
    pub fn flush(&self) -> Result<()> {
        let segments = self.segments.write().unwrap();
        for segment in segments.iter() {
            segment.flush()?;
        }
        Ok(())
    }

    /// Close every segment, flushing buffers and right-sizing indexes.
    pub fn close(self) -> Result<()> {
        let segments = self.segments.into_inner().unwrap();
        for segment in segments {
            segment.close()?;
        }
        Ok(())
    }

    /// Close the log and delete its directory.
    pub fn remove(self) -> Result<()> {
        let dir = self.dir.clone();
        info!(dir = %dir.display(), "removing log");
        let segments = self.segments.into_inner().unwrap();
        for segment in segments {
            segment.remove()?;
        }
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    /// Remove the log and recreate it empty with the same configuration.
    pub fn reset(self) -> Result<Self> {
        let dir = self.dir.clone();
        let config = self.config;
        let codec = self.codec.clone();
        self.remove()?;
        Self::with_codec(dir, config, codec)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> Config {
        self.config
    }
}

/// Collect segment base offsets from the directory's file names. Each
/// base appears in both a `.store` and an `.index` name; the set
/// deduplicates them, and files that fit neither pattern are ignored.
fn discover_base_offsets(dir: &Path) -> Result<BTreeSet<u64>> {
    let mut base_offsets = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(stem) = name
            .strip_suffix(".store")
            .or_else(|| name.strip_suffix(".index"))
        else {
            continue;
        };
        if let Ok(base_offset) = stem.parse::<u64>() {
            base_offsets.insert(base_offset);
        }
    }
    Ok(base_offsets)
}
