//! Record data structure.
//!
//! A record is a single entry in the log: an opaque byte payload plus the
//! offset the engine assigned to it. Offsets are assigned at append time
//! and stamped onto records returned from reads; a record built by a
//! caller carries offset 0 until the log accepts it.
//!
//! Uses `bytes::Bytes` for the payload so clones are reference-counted
//! rather than copied.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single record in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload bytes.
    pub value: Bytes,

    /// Offset assigned by the engine; 0 until appended.
    pub offset: u64,
}

impl Record {
    /// Build a record that has not yet been appended.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_unassigned() {
        let rec = Record::new("hello world");
        assert_eq!(rec.offset, 0);
        assert_eq!(rec.value, Bytes::from("hello world"));
    }

    #[test]
    fn test_new_with_empty_value() {
        let rec = Record::new(Bytes::new());
        assert!(rec.value.is_empty());
    }

    #[test]
    fn test_new_preserves_binary_value() {
        let value = Bytes::from(vec![0u8, 1, 2, 127, 128, 255]);
        let rec = Record::new(value.clone());
        assert_eq!(rec.value, value);
    }

    #[test]
    fn test_eq_depends_on_offset_and_value() {
        let a = Record::new("v");
        let mut b = Record::new("v");
        assert_eq!(a, b);
        b.offset = 1;
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_independence() {
        let rec = Record {
            value: Bytes::from("val"),
            offset: 7,
        };
        let cloned = rec.clone();
        assert_eq!(rec, cloned);
    }

    #[test]
    fn test_serde_roundtrip() {
        let rec = Record {
            value: Bytes::from(vec![0u8, 1, 2, 255]),
            offset: 42,
        };
        let json = serde_json::to_string(&rec).expect("serialize");
        let deserialized: Record = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(rec, deserialized);
    }

    #[test]
    fn test_serde_json_structure() {
        let rec = Record::new("hi");
        let val: serde_json::Value = serde_json::to_value(&rec).expect("to_value");
        assert_eq!(val["offset"], 0);
    }
}
