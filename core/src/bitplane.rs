//! Bit-packed flag arrays
//!
//! A table of `items × columns` booleans is stored as one bit plane per
//! column, planes back to back with no interleaving. Item `i` of a column is
//! bit `i % 8` (LSB first) of byte `i / 8` of that column's plane. Each plane
//! is `ceil(items / 8)` bytes; unused high bits of the last byte are written
//! as zero.
//!
//! ```text
//! items = 9, columns = 2
//!
//! [c0 i0..i7][c0 i8 + pad][c1 i0..i7][c1 i8 + pad]
//! ```

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{MarshalError, Result};

/// Bytes in one plane for `item_count` items.
pub const fn plane_len(item_count: usize) -> usize {
    item_count.div_ceil(8)
}

fn pack_plane(bits: &[bool], out: &mut [u8]) {
    out.fill(0);
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            out[i / 8] |= 1 << (i % 8);
        }
    }
}

fn unpack_plane(bytes: &[u8], item_count: usize) -> Vec<bool> {
    (0..item_count)
        .map(|i| (bytes[i / 8] >> (i % 8)) & 1 != 0)
        .collect()
}

/// A boolean matrix stored column by column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitPlanes {
    item_count: usize,
    columns: Vec<Vec<bool>>,
}

impl BitPlanes {
    /// All-false matrix.
    pub fn new(item_count: usize, column_count: usize) -> Self {
        Self {
            item_count,
            columns: vec![vec![false; item_count]; column_count],
        }
    }

    /// Build from per-column vectors, each `item_count` long.
    pub fn from_columns(item_count: usize, columns: Vec<Vec<bool>>) -> Result<Self> {
        if let Some(bad) = columns.iter().find(|c| c.len() != item_count) {
            return Err(MarshalError::SizeMismatch {
                what: "BitPlanes column",
                expected: item_count,
                actual: bad.len(),
            });
        }
        Ok(Self {
            item_count,
            columns,
        })
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Flag of `item` in `column`. Out of range reads as `false`.
    pub fn get(&self, item: usize, column: usize) -> bool {
        self.columns
            .get(column)
            .and_then(|c| c.get(item))
            .copied()
            .unwrap_or(false)
    }

    /// Set a flag. Returns `false` if out of range.
    pub fn set(&mut self, item: usize, column: usize, value: bool) -> bool {
        match self.columns.get_mut(column).and_then(|c| c.get_mut(item)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn column(&self, column: usize) -> Option<&[bool]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// One item's flags across all columns.
    pub fn row(&self, item: usize) -> Vec<bool> {
        self.columns
            .iter()
            .map(|c| c.get(item).copied().unwrap_or(false))
            .collect()
    }

    /// Size of the packed form.
    pub const fn encoded_len(item_count: usize, column_count: usize) -> usize {
        column_count * plane_len(item_count)
    }

    /// Decode `column_count` planes of `item_count` items.
    pub fn read(r: &mut ByteReader<'_>, item_count: usize, column_count: usize) -> Result<Self> {
        let plane = plane_len(item_count);
        let bytes = r.read_bytes(Self::encoded_len(item_count, column_count))?;
        let columns = if plane == 0 {
            vec![Vec::new(); column_count]
        } else {
            bytes
                .chunks_exact(plane)
                .map(|chunk| unpack_plane(chunk, item_count))
                .collect()
        };
        Ok(Self {
            item_count,
            columns,
        })
    }

    /// Encode every plane.
    pub fn write(&self, w: &mut ByteWriter<'_>) -> Result<()> {
        let plane = plane_len(self.item_count);
        let mut bytes = vec![0u8; Self::encoded_len(self.item_count, self.columns.len())];
        if plane > 0 {
            for (column, out) in self.columns.iter().zip(bytes.chunks_exact_mut(plane)) {
                pack_plane(column, out);
            }
        }
        w.write_bytes(&bytes)
    }
}

/// A typed row of flags stored across bit planes.
pub trait FlagRow: Sized {
    /// Number of planes.
    const COLUMNS: usize;

    /// Build a row from `COLUMNS` bits, in plane order.
    fn from_bits(bits: &[bool]) -> Self;

    /// Value of one column.
    fn bit(&self, column: usize) -> bool;
}

/// Decode `item_count` typed rows.
pub fn read_rows<T: FlagRow>(r: &mut ByteReader<'_>, item_count: usize) -> Result<Vec<T>> {
    let planes = BitPlanes::read(r, item_count, T::COLUMNS)?;
    Ok((0..item_count)
        .map(|item| T::from_bits(&planes.row(item)))
        .collect())
}

/// Encode typed rows as `T::COLUMNS` planes.
pub fn write_rows<T: FlagRow>(w: &mut ByteWriter<'_>, rows: &[T]) -> Result<()> {
    let mut planes = BitPlanes::new(rows.len(), T::COLUMNS);
    for (item, row) in rows.iter().enumerate() {
        for column in 0..T::COLUMNS {
            planes.set(item, column, row.bit(column));
        }
    }
    planes.write(w)
}
