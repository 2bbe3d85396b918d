//! Positioned byte cursors
//!
//! [`ByteReader`] and [`ByteWriter`] walk an in-memory buffer front to back.
//! All multi-byte values are little-endian. Every primitive either moves the
//! offset by exactly its width or fails without moving it:
//!
//! - reads past the end fail with [`MarshalError::Underrun`]
//! - writes past the end of a fixed destination fail with [`MarshalError::Overrun`]
//!
//! Offsets only move forward. The single exception is [`ByteWriter::seek`],
//! which is crate-private and used by the block framer to patch a length
//! field once the payload size is known.
//!
//! Both cursors track the start of the record currently being decoded or
//! encoded, so [`ByteReader::align`] and [`ByteWriter::align`] pad relative to
//! that record rather than to the start of the buffer.

use byteorder::{ByteOrder, LittleEndian};
use bytemuck::Pod;

use crate::config::CodecConfig;
use crate::error::{MarshalError, Result};

/// Padding needed to move `relative` up to the next multiple of `alignment`.
#[inline]
fn padding_for(relative: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - relative % alignment) % alignment
}

// =============================================================================
// Reader
// =============================================================================

/// Forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    record_base: usize,
    config: CodecConfig,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            record_base: 0,
            config: CodecConfig::default(),
        }
    }

    /// Use `config` for limits and logging.
    pub fn with_config(mut self, config: &CodecConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Current offset from the start of the enclosing record.
    pub fn record_offset(&self) -> usize {
        self.offset - self.record_base
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Take `n` bytes and advance.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(MarshalError::Underrun {
                offset: self.offset,
                requested: n,
                remaining,
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Read `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    /// Read a one-byte boolean (any non-zero value is `true`).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    /// Read a plain-old-data struct in its in-memory layout.
    ///
    /// The struct is copied out, so the source needs no particular alignment.
    pub fn read_pod<T: Pod>(&mut self) -> Result<T> {
        let bytes = self.take(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Advance `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Skip padding up to the next multiple of `alignment`, measured from the
    /// start of the enclosing record. Padding content is not validated.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        self.skip(padding_for(self.record_offset(), alignment))
    }

    /// Mark the current offset as the start of a record. Returns the previous
    /// base so nested records can restore it.
    pub(crate) fn enter_record(&mut self) -> usize {
        std::mem::replace(&mut self.record_base, self.offset)
    }

    pub(crate) fn leave_record(&mut self, previous_base: usize) {
        self.record_base = previous_base;
    }
}

// =============================================================================
// Writer
// =============================================================================

#[derive(Debug)]
enum Sink<'a> {
    /// Grows as needed
    Growable(Vec<u8>),
    /// Fixed-size destination; writes past the end fail
    Fixed(&'a mut [u8]),
}

/// Forward-only writer into a growable or fixed-size buffer.
///
/// Writing at the current offset overwrites whatever is there. A growable
/// buffer is extended as needed; a fixed one rejects writes that would not fit
/// and leaves the destination untouched.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    sink: Sink<'a>,
    offset: usize,
    record_base: usize,
    config: CodecConfig,
}

impl ByteWriter<'static> {
    /// Create an empty growable writer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a growable writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: Sink::Growable(Vec::with_capacity(capacity)),
            offset: 0,
            record_base: 0,
            config: CodecConfig::default(),
        }
    }
}

impl Default for ByteWriter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ByteWriter<'a> {
    /// Create a writer over a fixed-size destination, positioned at its start.
    pub fn fixed(buffer: &'a mut [u8]) -> Self {
        Self {
            sink: Sink::Fixed(buffer),
            offset: 0,
            record_base: 0,
            config: CodecConfig::default(),
        }
    }

    /// Use `config` for fill bytes and logging.
    pub fn with_config(mut self, config: &CodecConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Current offset from the start of the enclosing record.
    pub fn record_offset(&self) -> usize {
        self.offset - self.record_base
    }

    /// Capacity of a fixed destination, `None` for growable buffers.
    pub fn capacity(&self) -> Option<usize> {
        match &self.sink {
            Sink::Growable(_) => None,
            Sink::Fixed(buf) => Some(buf.len()),
        }
    }

    /// The buffer contents. For a fixed destination this is the whole slice.
    pub fn as_slice(&self) -> &[u8] {
        match &self.sink {
            Sink::Growable(vec) => vec,
            Sink::Fixed(buf) => buf,
        }
    }

    /// Consume the writer, returning the bytes.
    pub fn into_vec(self) -> Vec<u8> {
        match self.sink {
            Sink::Growable(vec) => vec,
            Sink::Fixed(buf) => buf.to_vec(),
        }
    }

    /// Make room for `n` bytes at the current offset, advance, and return the
    /// slot to fill.
    fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        let start = self.offset;
        let end = start + n;
        match &mut self.sink {
            Sink::Growable(vec) => {
                if vec.len() < end {
                    vec.resize(end, 0);
                }
                self.offset = end;
                Ok(&mut vec[start..end])
            }
            Sink::Fixed(buf) => {
                if end > buf.len() {
                    return Err(MarshalError::Overrun {
                        offset: start,
                        requested: n,
                        capacity: buf.len(),
                    });
                }
                self.offset = end;
                Ok(&mut buf[start..end])
            }
        }
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Write a one-byte boolean (0 or 1).
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        LittleEndian::write_u16(self.reserve(2)?, value);
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        LittleEndian::write_i16(self.reserve(2)?, value);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        LittleEndian::write_u32(self.reserve(4)?, value);
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        LittleEndian::write_i32(self.reserve(4)?, value);
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        LittleEndian::write_f32(self.reserve(4)?, value);
        Ok(())
    }

    /// Write a plain-old-data struct in its in-memory layout.
    pub fn write_pod<T: Pod>(&mut self, value: &T) -> Result<()> {
        self.write_bytes(bytemuck::bytes_of(value))
    }

    /// Write `n` copies of `byte`.
    pub fn fill(&mut self, byte: u8, n: usize) -> Result<()> {
        self.reserve(n)?.fill(byte);
        Ok(())
    }

    /// Write `n` bytes of the configured fill pattern over a don't-care region.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let fill = self.config.padding.fill;
        self.fill(fill, n)
    }

    /// Zero-fill up to the next multiple of `alignment`, measured from the
    /// start of the enclosing record.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        self.fill(0, padding_for(self.record_offset(), alignment))
    }

    /// Reposition the writer. Only the block framer backtracks, to patch a
    /// length field after its payload has been written.
    pub(crate) fn seek(&mut self, offset: usize) -> Result<()> {
        let len = self.as_slice().len();
        if offset > len {
            return Err(MarshalError::Overrun {
                offset,
                requested: 0,
                capacity: len,
            });
        }
        self.offset = offset;
        Ok(())
    }

    pub(crate) fn enter_record(&mut self) -> usize {
        std::mem::replace(&mut self.record_base, self.offset)
    }

    pub(crate) fn leave_record(&mut self, previous_base: usize) {
        self.record_base = previous_base;
    }
}
