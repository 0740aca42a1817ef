//! Append-only store file.
//!
//! The store is the byte-level home of record payloads. Entries are
//! length-prefixed and tightly packed:
//!
//! ```text
//! ┌──────────────────┬───────────────────┐
//! │ Length (u64, BE) │ Payload (N bytes) │
//! └──────────────────┴───────────────────┘
//! ┌──────────────────┬───────────────────┐
//! │ Length (u64, BE) │ Payload (M bytes) │
//! └──────────────────┴───────────────────┘
//! ...
//! ```
//!
//! The 8-byte big-endian prefix is part of the on-disk format and must
//! not vary. Appends go through a buffered writer; `size` reflects bytes
//! accepted by the buffer, and every read path flushes first so
//! file-positioned reads always observe accepted appends.
//!
//! All public operations serialize on an internal mutex. The store never
//! interprets payload bytes; which positions hold live records is the
//! index's business.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Width of the length prefix in bytes.
pub(crate) const LEN_WIDTH: u64 = 8;

#[derive(Debug)]
pub struct Store {
    inner: Mutex<StoreInner>,
    path: PathBuf,
}

#[derive(Debug)]
struct StoreInner {
    /// Buffered append handle; the file is opened in append mode so
    /// writes land at the end regardless of the read handle's cursor.
    writer: BufWriter<File>,
    /// Separate handle for positional reads.
    reader: File,
    /// Bytes accepted so far, including any still in the write buffer.
    size: u64,
}

impl Store {
    /// Open or create the store file at `path`, recovering its size from
    /// the filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();
        let reader = file.try_clone()?;

        Ok(Self {
            inner: Mutex::new(StoreInner {
                writer: BufWriter::new(file),
                reader,
                size,
            }),
            path,
        })
    }

    /// Append a length-prefixed payload. Returns the total bytes written
    /// (prefix included) and the position the entry starts at.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock().unwrap();
        let position = inner.size;

        inner.writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;
        Ok((written, position))
    }

    /// Read the payload whose entry starts at `position`.
    pub fn read(&self, position: u64) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        inner.reader.seek(SeekFrom::Start(position))?;
        inner.reader.read_exact(&mut len_buf)?;
        let len = u64::from_be_bytes(len_buf);

        // A prefix pointing past the accepted size means the bytes at
        // this position are not a record.
        if len > inner.size.saturating_sub(position.saturating_add(LEN_WIDTH)) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("record at position {position} extends past end of store"),
            )));
        }

        let mut payload = vec![0u8; len as usize];
        inner.reader.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Positional read of raw store bytes for bulk streaming. Returns the
    /// number of bytes read; 0 at end of file.
    pub fn read_at(&self, buf: &mut [u8], position: u64) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;

        inner.reader.seek(SeekFrom::Start(position))?;
        let n = inner.reader.read(buf)?;
        Ok(n)
    }

    /// Push buffered appends to the OS.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;
        Ok(())
    }

    /// Flush buffered appends and fsync. The descriptor itself is
    /// released when the store is dropped.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Bytes accepted so far, including buffered ones.
    pub fn size(&self) -> u64 {
        self.inner.lock().unwrap().size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAYLOAD: &[u8] = b"hello world";

    #[test]
    fn test_append_read() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let mut positions = Vec::new();
        for _ in 0..3 {
            let (written, position) = store.append(PAYLOAD).unwrap();
            assert_eq!(written, LEN_WIDTH + PAYLOAD.len() as u64);
            positions.push(position);
        }
        assert_eq!(store.size(), 3 * (LEN_WIDTH + PAYLOAD.len() as u64));

        for position in positions {
            assert_eq!(store.read(position).unwrap(), PAYLOAD);
        }
    }

    #[test]
    fn test_read_sees_buffered_appends() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();

        let (_, position) = store.append(PAYLOAD).unwrap();
        // No explicit flush: read must flush the buffer itself.
        assert_eq!(store.read(position).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_read_at() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(PAYLOAD).unwrap();

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        let n = store.read_at(&mut len_buf, 0).unwrap();
        assert_eq!(n, LEN_WIDTH as usize);
        assert_eq!(u64::from_be_bytes(len_buf), PAYLOAD.len() as u64);

        let mut payload = vec![0u8; PAYLOAD.len()];
        let n = store.read_at(&mut payload, LEN_WIDTH).unwrap();
        assert_eq!(n, PAYLOAD.len());
        assert_eq!(payload, PAYLOAD);
    }

    #[test]
    fn test_read_at_past_end_returns_zero() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(PAYLOAD).unwrap();

        let mut buf = [0u8; 16];
        let n = store.read_at(&mut buf, store.size()).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_size_recovered_on_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.store");

        let store = Store::open(&path).unwrap();
        let (_, position) = store.append(PAYLOAD).unwrap();
        store.close().unwrap();
        let expected = store.size();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.size(), expected);
        assert_eq!(reopened.read(position).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_read_of_non_record_position_fails() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("0.store")).unwrap();
        store.append(PAYLOAD).unwrap();

        // Positions inside the payload decode a garbage length prefix;
        // the store reports corruption rather than allocating for it.
        let err = store.read(LEN_WIDTH + 1).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
