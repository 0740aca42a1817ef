//! The record serialization seam.
//!
//! The storage engine never interprets payload bytes; it hands records to
//! a [`RecordCodec`] on the way in and back through it on the way out.
//! The engine's only requirement is byte-exact round-trip: for any record
//! `r`, `decode(encode(r))` yields a record with the same value.
//!
//! Offsets are owned by the engine, not the codec. A codec may embed the
//! offset in its wire form if a caller's schema wants it, but the engine
//! always overwrites the decoded offset with the one recorded in the
//! index, so the index stays authoritative.

use bytes::Bytes;

use crate::error::Result;
use crate::record::Record;

/// Maps records to and from their stored byte form.
pub trait RecordCodec: Send + Sync {
    fn encode(&self, record: &Record) -> Result<Bytes>;
    fn decode(&self, bytes: &[u8]) -> Result<Record>;
}

/// Default codec: the stored bytes are the record value, verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCodec;

impl RecordCodec for PayloadCodec {
    fn encode(&self, record: &Record) -> Result<Bytes> {
        Ok(record.value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        Ok(Record {
            value: Bytes::copy_from_slice(bytes),
            offset: 0,
        })
    }
}
