//! Array codecs
//!
//! Save files store arrays in three ways, and each table states which one it
//! uses. Nothing is inferred from the data:
//!
//! | Layout           | On disk                                   |
//! |------------------|-------------------------------------------|
//! | `CountPrefixed`  | `u32` count, then `count` elements        |
//! | `FixedCapacity`  | always `capacity` elements                |
//! | `OverAllocated`  | `count` elements plus one spare element   |
//!
//! For `FixedCapacity` the logical count is a separate field of the owning
//! record. Decoding returns every slot, including unused ones, so that stale
//! data in unused slots survives a round-trip.
//!
//! For `OverAllocated` the count comes from an earlier field. The spare
//! element is written as `T::default()` and discarded on decode.

use savewire_shared::FileFormat;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{MarshalError, Result};
use crate::record::{FixedRecord, Record};

/// How an array is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLayout {
    /// `u32` count followed by the elements. `max` bounds the count; without
    /// it the reader's configured `limits.max_count` applies.
    CountPrefixed { max: Option<usize> },
    /// Exactly `capacity` elements, unused slots padded with defaults.
    FixedCapacity { capacity: usize },
    /// `count` elements followed by one spare.
    OverAllocated { count: usize },
}

impl ArrayLayout {
    /// Count-prefixed with no explicit bound.
    pub const fn counted() -> Self {
        Self::CountPrefixed { max: None }
    }

    pub const fn counted_max(max: usize) -> Self {
        Self::CountPrefixed { max: Some(max) }
    }

    pub const fn fixed(capacity: usize) -> Self {
        Self::FixedCapacity { capacity }
    }

    pub const fn over_allocated(count: usize) -> Self {
        Self::OverAllocated { count }
    }

    /// Number of elements physically stored for `len` logical elements.
    pub fn stored_len(&self, len: usize) -> usize {
        match *self {
            Self::CountPrefixed { .. } => len,
            Self::FixedCapacity { capacity } => capacity,
            Self::OverAllocated { count } => count + 1,
        }
    }

    fn prefix_len(&self) -> usize {
        match self {
            Self::CountPrefixed { .. } => 4,
            _ => 0,
        }
    }

    /// Reject `len` if it does not fit this layout.
    fn check_len(&self, what: &'static str, len: usize, max_count: usize) -> Result<()> {
        match *self {
            Self::CountPrefixed { max } => {
                let capacity = max.unwrap_or(max_count);
                if len > capacity {
                    return Err(MarshalError::CapacityExceeded {
                        what,
                        count: len,
                        capacity,
                    });
                }
            }
            Self::FixedCapacity { capacity } => {
                if len > capacity {
                    return Err(MarshalError::CapacityExceeded {
                        what,
                        count: len,
                        capacity,
                    });
                }
            }
            Self::OverAllocated { count } => {
                if len != count {
                    return Err(MarshalError::SizeMismatch {
                        what,
                        expected: count,
                        actual: len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Encoded size of `len` logical elements of a fixed-size record.
    pub fn encoded_size<T: FixedRecord>(&self, len: usize, format: FileFormat) -> Result<usize> {
        Ok(self.prefix_len() + self.stored_len(len) * T::fixed_size(format)?)
    }

    /// Encoded size of `items`, for elements whose size depends on their contents.
    pub fn size_of<T: Record + Default>(&self, items: &[T], format: FileFormat) -> Result<usize> {
        let mut size = self.prefix_len();
        for item in items {
            size += item.size(format)?;
        }
        let padding = self.stored_len(items.len()).saturating_sub(items.len());
        if padding > 0 {
            size += padding * T::default().size(format)?;
        }
        Ok(size)
    }

    /// Decode an array.
    ///
    /// `FixedCapacity` returns all `capacity` slots; `OverAllocated` returns
    /// `count` elements with the spare already dropped.
    pub fn read<T: Record + Default>(
        &self,
        what: &'static str,
        r: &mut ByteReader<'_>,
        format: FileFormat,
    ) -> Result<Vec<T>> {
        let stored = match *self {
            Self::CountPrefixed { .. } => {
                let count = r.read_u32()? as usize;
                self.check_len(what, count, r.config().limits.max_count)?;
                count
            }
            _ => self.stored_len(0),
        };

        if let Self::OverAllocated { count } = *self {
            tracing::trace!(what, count, "Reading over-allocated array");
        }

        // A corrupt count must not drive a huge allocation
        let mut items = Vec::with_capacity(stored.min(r.remaining()));
        for _ in 0..stored {
            items.push(r.read_record::<T>(format)?);
        }

        if let Self::OverAllocated { .. } = self {
            items.pop();
        }
        Ok(items)
    }

    /// Encode an array.
    ///
    /// The length is checked before anything is written, so a rejected array
    /// leaves the writer where it was.
    pub fn write<T: Record + Default>(
        &self,
        what: &'static str,
        items: &[T],
        w: &mut ByteWriter<'_>,
        format: FileFormat,
    ) -> Result<()> {
        self.check_len(what, items.len(), w.config().limits.max_count)?;

        if let Self::CountPrefixed { .. } = self {
            let count = u32::try_from(items.len()).map_err(|_| MarshalError::CapacityExceeded {
                what,
                count: items.len(),
                capacity: u32::MAX as usize,
            })?;
            w.write_u32(count)?;
        }

        for item in items {
            w.write_record(item, format)?;
        }

        let padding = self.stored_len(items.len()) - items.len();
        if padding > 0 {
            let filler = T::default();
            for _ in 0..padding {
                w.write_record(&filler, format)?;
            }
        }
        Ok(())
    }
}
