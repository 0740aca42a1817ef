//! loghouse storage engine.
//!
//! This crate implements the on-disk commit log: a durable, append-only
//! sequence of opaque byte records, each addressed by a monotonically
//! increasing 64-bit offset assigned at append time.
//!
//! ## On-disk layout
//!
//! A log directory holds one file pair per segment, named for the
//! segment's base offset:
//!
//! ```text
//! data/orders-0/
//! ├── 0.store      (u64 BE length, payload)*
//! ├── 0.index      (u32 BE relative offset, u64 BE store position)*
//! ├── 1749.store
//! └── 1749.index
//! ```
//!
//! The store is the record data; the index maps relative offsets to
//! store positions and is memory-mapped, padded to its configured
//! maximum while open and truncated to its live entries on clean close.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Log          routing, rollover, truncation   │
//! ├──────────────────────────────────────────────┤
//! │ Segment      one offset range, store+index   │
//! ├──────────────────────┬───────────────────────┤
//! │ Store                │ Index                 │
//! │ length-prefixed data │ mmap offset table     │
//! └──────────────────────┴───────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use loghouse_core::Record;
//! use loghouse_storage::{Config, Log};
//!
//! let log = Log::open("./data/orders-0", Config::default())?;
//!
//! let offset = log.append(&Record::new("hello world"))?;
//! let record = log.read(offset)?;
//! assert_eq!(record.value, "hello world");
//!
//! // Bulk transfer of the raw log bytes:
//! let mut snapshot = Vec::new();
//! std::io::Read::read_to_end(&mut log.reader(), &mut snapshot)?;
//!
//! log.close()?;
//! ```
//!
//! The `Log` API is safe for concurrent callers. All operations are
//! synchronous and may block on disk IO; wrap calls in your own task
//! pool if you need async semantics. A log directory belongs to exactly
//! one `Log` instance — sharing it across processes is undefined.

pub mod config;
pub mod error;
pub mod index;
pub mod log;
pub mod reader;
pub mod segment;
pub mod store;

pub use config::{Config, SegmentConfig};
pub use error::{Error, Result};
pub use index::Index;
pub use log::Log;
pub use reader::LogReader;
pub use segment::Segment;
pub use store::Store;
