//! Bulk sequential reader.
//!
//! [`LogReader`] exposes the whole log as one byte stream for
//! out-of-band transfer, e.g. shipping a snapshot to a new replica. The
//! stream is the concatenation of each segment's raw store bytes in
//! base-offset order, each from position 0, with no delimiters between
//! segments; consumers re-parse it by reading an 8-byte big-endian
//! length, that many payload bytes, and repeating — the same rule
//! carries across segment boundaries.
//!
//! The reader holds shared store handles from the moment `Log::reader`
//! was called; segments appended afterwards are not part of the stream.

use std::io::Read;
use std::sync::Arc;

use crate::store::Store;

pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,
    position: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            position: 0,
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let Some(store) = self.stores.get(self.current) else {
                return Ok(0);
            };
            let n = store.read_at(buf, self.position)?;
            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }
            // This store is exhausted; continue into the next one.
            self.current += 1;
            self.position = 0;
        }
    }
}
