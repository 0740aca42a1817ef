//! Log configuration.
//!
//! Controls how segments are sized and where a fresh log starts:
//!
//! - **max_store_bytes**: a segment stops accepting appends once its store
//!   file reaches this size
//! - **max_index_bytes**: physical size of each segment's index file; one
//!   index entry costs 12 bytes
//! - **initial_offset**: base offset of the first segment when the
//!   directory holds no prior state
//!
//! Zero caps are replaced with the defaults when the log is opened, so a
//! `Config::default()` and an all-zero deserialized config behave the
//! same.
//!
//! ```ignore
//! use loghouse_storage::{Config, Log};
//!
//! let mut config = Config::default();
//! config.segment.max_store_bytes = 64 * 1024 * 1024;
//! let log = Log::open("./data/orders-0", config)?;
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,
}

/// Size limits for a single segment's file pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Store bytes at which a segment counts as maxed (default: 1024).
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Physical index file size in bytes (default: 1024).
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// First offset assigned when no on-disk state exists (default: 0).
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

impl Config {
    /// Replace zero caps with the defaults. Applied once at log open.
    pub(crate) fn normalized(mut self) -> Self {
        if self.segment.max_store_bytes == 0 {
            self.segment.max_store_bytes = default_max_store_bytes();
        }
        if self.segment.max_index_bytes == 0 {
            self.segment.max_index_bytes = default_max_index_bytes();
        }
        self
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}
