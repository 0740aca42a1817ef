//! Storage error types.
//!
//! Every fallible operation in this crate returns [`Result`]. IO failures
//! from the filesystem or the index mapping pass through unchanged; the
//! engine performs no retries.
//!
//! `OffsetOutOfRange` carries the offending offset so the caller (an RPC
//! layer, typically) can report exactly which read missed. `IndexFull` is
//! the refusal a segment gives once its index has no room for another
//! entry; the log normally preempts it by rolling over, so seeing it from
//! `Log::append` means a single record outgrew the configured caps.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("offset out of range: {offset}")]
    OffsetOutOfRange { offset: u64 },

    #[error("index full")]
    IndexFull,

    #[error("codec error: {0}")]
    Codec(#[from] loghouse_core::Error),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}
