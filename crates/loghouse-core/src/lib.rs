//! Core types shared across loghouse crates.
//!
//! This crate defines the vocabulary of the commit log:
//!
//! - [`Record`] — an opaque payload plus its engine-assigned offset
//! - [`RecordCodec`] — the serialization seam between callers and the
//!   storage engine, with [`PayloadCodec`] as the default implementation
//! - [`Error`]/[`Result`] — codec-level error reporting

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{PayloadCodec, RecordCodec};
pub use error::{Error, Result};
pub use record::Record;
