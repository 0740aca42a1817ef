//! Error types for record encoding and decoding.
//!
//! The storage engine treats decode failures as corruption: a store
//! position that yields bytes the codec cannot decode means the file no
//! longer matches what the index promises.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("record encode failed: {0}")]
    Encode(String),

    #[error("record decode failed: {0}")]
    Decode(String),
}
