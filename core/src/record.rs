//! The record contract
//!
//! Every record type implements [`Record`]: a body reader, a body writer and
//! a size function, all parametrized by the [`FileFormat`]. Callers never
//! invoke the bodies directly; they go through [`decode`] and [`encode`],
//! which enforce the size invariant:
//!
//! ```text
//! offset_after - offset_before == record.size(format)
//! ```
//!
//! on every decode and every encode. A violation is a layout bug; it is
//! logged and surfaced as [`MarshalError::SizeMismatch`] instead of letting
//! the cursor drift into the next record.
//!
//! Types whose size does not depend on their contents also implement
//! [`FixedRecord`], which gives the size without an instance. Array codecs
//! rely on it to size tables without encoding them.

use savewire_shared::{FileFormat, PerFormat};

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{MarshalError, Result};

/// A value with a format-dependent binary layout.
pub trait Record: Sized {
    /// Name used in errors and log events.
    const NAME: &'static str;

    /// Read the record body from the current offset.
    ///
    /// Use [`decode`] instead of calling this directly.
    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self>;

    /// Write the record body at the current offset.
    ///
    /// Use [`encode`] instead of calling this directly.
    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()>;

    /// Encoded size in bytes under `format`.
    ///
    /// Must be computable without encoding: a function of the format plus, at
    /// most, small pieces of already-known state such as element counts.
    fn size(&self, format: FileFormat) -> Result<usize>;
}

/// A record whose size depends only on the format.
pub trait FixedRecord: Record {
    fn fixed_size(format: FileFormat) -> Result<usize>;
}

/// Look up a per-variant table entry for `record`.
///
/// A missing entry is [`MarshalError::UnsupportedVariant`].
pub fn require<T: Copy>(table: &PerFormat<T>, record: &'static str, format: FileFormat) -> Result<T> {
    table
        .get(format)
        .ok_or(MarshalError::UnsupportedVariant { record, format })
}

fn check_size(what: &'static str, expected: usize, actual: usize, start: usize) -> Result<()> {
    if expected != actual {
        tracing::error!(
            record = what,
            expected,
            actual,
            offset = start,
            "Record size invariant violated"
        );
        return Err(MarshalError::SizeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Decode one record, checking that it consumed exactly `size` bytes.
pub fn decode<R: Record>(r: &mut ByteReader<'_>, format: FileFormat) -> Result<R> {
    let start = r.position();
    let outer = r.enter_record();
    let result = R::read(r, format);
    r.leave_record(outer);
    let record = result?;

    let consumed = r.position() - start;
    check_size(R::NAME, record.size(format)?, consumed, start)?;
    if r.config().logging.trace_records {
        tracing::trace!(record = R::NAME, offset = start, size = consumed, %format, "Decoded record");
    }
    Ok(record)
}

/// Encode one record, checking that it produced exactly `size` bytes.
pub fn encode<R: Record>(record: &R, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
    let start = w.position();
    let outer = w.enter_record();
    let result = record.write(w, format);
    w.leave_record(outer);
    result?;

    let produced = w.position() - start;
    check_size(R::NAME, record.size(format)?, produced, start)?;
    if w.config().logging.trace_records {
        tracing::trace!(record = R::NAME, offset = start, size = produced, %format, "Encoded record");
    }
    Ok(())
}

/// Encode a record into a new buffer of exactly its declared size.
pub fn to_bytes<R: Record>(record: &R, format: FileFormat) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; record.size(format)?];
    let mut w = ByteWriter::fixed(&mut buffer);
    encode(record, &mut w, format)?;
    Ok(buffer)
}

/// Decode a record that must span the whole of `bytes`.
pub fn from_bytes<R: Record>(bytes: &[u8], format: FileFormat) -> Result<R> {
    let mut r = ByteReader::new(bytes);
    let record = decode(&mut r, format)?;
    if r.remaining() != 0 {
        return Err(MarshalError::SizeMismatch {
            what: R::NAME,
            expected: bytes.len(),
            actual: r.position(),
        });
    }
    Ok(record)
}

impl<'a> ByteReader<'a> {
    /// Decode a record at the current offset. See [`decode`].
    pub fn read_record<R: Record>(&mut self, format: FileFormat) -> Result<R> {
        decode(self, format)
    }
}

impl<'a> ByteWriter<'a> {
    /// Encode a record at the current offset. See [`encode`].
    pub fn write_record<R: Record>(&mut self, record: &R, format: FileFormat) -> Result<()> {
        encode(record, self, format)
    }
}

// =============================================================================
// Scalars
// =============================================================================

macro_rules! impl_scalar_record {
    ($ty:ty, $name:literal, $read:ident, $write:ident) => {
        impl Record for $ty {
            const NAME: &'static str = $name;

            fn read(r: &mut ByteReader<'_>, _format: FileFormat) -> Result<Self> {
                r.$read()
            }

            fn write(&self, w: &mut ByteWriter<'_>, _format: FileFormat) -> Result<()> {
                w.$write(*self)
            }

            fn size(&self, format: FileFormat) -> Result<usize> {
                Self::fixed_size(format)
            }
        }

        impl FixedRecord for $ty {
            fn fixed_size(_format: FileFormat) -> Result<usize> {
                Ok(std::mem::size_of::<$ty>())
            }
        }
    };
}

impl_scalar_record!(u8, "u8", read_u8, write_u8);
impl_scalar_record!(i8, "i8", read_i8, write_i8);
impl_scalar_record!(u16, "u16", read_u16, write_u16);
impl_scalar_record!(i16, "i16", read_i16, write_i16);
impl_scalar_record!(u32, "u32", read_u32, write_u32);
impl_scalar_record!(i32, "i32", read_i32, write_i32);
impl_scalar_record!(f32, "f32", read_f32, write_f32);
impl_scalar_record!(bool, "bool", read_bool, write_bool);

// =============================================================================
// Opaque spans
// =============================================================================

/// Bytes with no meaning to the editor (runtime or physics state).
///
/// Preserved verbatim on decode and written back verbatim on encode. The span
/// length is declared by the owning record, usually from a `PerFormat` table.
/// An empty span (the `Default`) has never been decoded and encodes as zeros
/// of whatever length the format declares.
///
/// Equality treats every all-zero span as the same value whatever its length,
/// so a default span equals the zeros it decodes back as.
#[derive(Debug, Clone, Default)]
pub struct Opaque(Vec<u8>);

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        (self.is_zero() && other.is_zero()) || self.0 == other.0
    }
}

impl Eq for Opaque {}

impl Opaque {
    /// A zero-filled span, used when building records from scratch.
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Read `len` bytes verbatim.
    pub fn read(r: &mut ByteReader<'_>, len: usize) -> Result<Self> {
        Ok(Self(r.read_bytes(len)?.to_vec()))
    }

    /// Write the span back, checking it still has the length the layout
    /// declares for this format.
    pub fn write(&self, w: &mut ByteWriter<'_>, expected_len: usize) -> Result<()> {
        if self.0.is_empty() {
            return w.fill(0, expected_len);
        }
        if self.0.len() != expected_len {
            return Err(MarshalError::SizeMismatch {
                what: "Opaque",
                expected: expected_len,
                actual: self.0.len(),
            });
        }
        w.write_bytes(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for an empty span or one holding only zero bytes.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
