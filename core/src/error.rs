//! Marshaling error types
//!
//! Every error here is a structural integrity failure: a truncated buffer, a
//! layout bug or a corrupted file. None are retried. They propagate to the
//! caller of the decode/encode in progress, which must discard any partially
//! written output.

use savewire_shared::FileFormat;

use crate::block::BlockTag;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Error type for decode/encode operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    /// A read needed more bytes than remain in the buffer
    #[error("Buffer underrun at offset {offset:#x}: need {requested} bytes, {remaining} remaining")]
    Underrun {
        offset: usize,
        requested: usize,
        remaining: usize,
    },

    /// A write would run past the end of a fixed-size destination
    #[error("Buffer overrun at offset {offset:#x}: writing {requested} bytes exceeds capacity {capacity}")]
    Overrun {
        offset: usize,
        requested: usize,
        capacity: usize,
    },

    /// A count is larger than the capacity configured for the array
    #[error("{what}: count {count} exceeds capacity {capacity}")]
    CapacityExceeded {
        what: &'static str,
        count: usize,
        capacity: usize,
    },

    /// Bytes consumed or produced differ from the declared size
    #[error("{what}: size mismatch (expected {expected} bytes, got {actual})")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A block header carries a different tag than the one expected here
    #[error("Unexpected block tag at offset {offset:#x}: expected {expected}, found {found}")]
    UnknownTag {
        expected: BlockTag,
        found: BlockTag,
        offset: usize,
    },

    /// The record has no layout for the requested format variant
    #[error("{record} has no layout for format {format}")]
    UnsupportedVariant {
        record: &'static str,
        format: FileFormat,
    },

    /// A discriminant or enum field holds a value with no meaning
    #[error("{what}: invalid value {value} at offset {offset:#x}")]
    InvalidValue {
        what: &'static str,
        value: u32,
        offset: usize,
    },

    /// Stored checksum does not match the bytes it covers
    #[error("Checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A block tag name longer than four bytes
    #[error("Invalid block tag {0:?}: tags are at most 4 bytes")]
    InvalidTag(String),
}

impl MarshalError {
    /// Shorthand for [`MarshalError::UnsupportedVariant`].
    pub fn unsupported(record: &'static str, format: FileFormat) -> Self {
        Self::UnsupportedVariant { record, format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            MarshalError::Underrun {
                offset: 0x10,
                requested: 4,
                remaining: 2
            }
            .to_string(),
            "Buffer underrun at offset 0x10: need 4 bytes, 2 remaining"
        );
        assert_eq!(
            MarshalError::CapacityExceeded {
                what: "PickupPool",
                count: 337,
                capacity: 336
            }
            .to_string(),
            "PickupPool: count 337 exceeds capacity 336"
        );
        assert_eq!(
            MarshalError::unsupported("Automobile", FileFormat::Ps2Japan).to_string(),
            "Automobile has no layout for format ps2-japan"
        );
        assert_eq!(
            MarshalError::UnknownTag {
                expected: BlockTag::new("VEH"),
                found: BlockTag::new("PED"),
                offset: 8
            }
            .to_string(),
            "Unexpected block tag at offset 0x8: expected VEH, found PED"
        );
    }
}
