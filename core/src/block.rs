//! Tagged, length-prefixed block framing
//!
//! # Wire layout
//!
//! ```text
//! 0x00: tag      [u8; 4]   ASCII, shorter names padded with trailing zeros
//! 0x04: length   u32 LE    payload bytes only, never the 8-byte header
//! 0x08: payload  [u8; length]
//! ```
//!
//! Writing reserves the header, lets the caller encode the payload, then
//! patches the length field with one backtracking seek. Reading returns the
//! declared length; once the payload has been decoded, [`BlockHeader::finish`]
//! checks that exactly that many bytes were consumed.
//!
//! The game also seals its saves with a wrapping byte-sum checksum;
//! [`byte_sum`], [`write_checksum`] and [`verify_checksum`] implement it.

use std::fmt;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{MarshalError, Result};

/// Size of the tag + length header.
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Size of a trailing checksum.
pub const CHECKSUM_SIZE: usize = 4;

// =============================================================================
// Tags
// =============================================================================

/// Four-byte block name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockTag([u8; 4]);

impl BlockTag {
    /// Build a tag from a name of at most four bytes, padded with zeros.
    ///
    /// Intended for constants; a longer name fails compilation when evaluated
    /// in a `const`. Use [`BlockTag::try_from`] for runtime strings.
    pub const fn new(name: &str) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() <= 4, "block tags are at most 4 bytes");
        let mut tag = [0u8; 4];
        let mut i = 0;
        while i < bytes.len() {
            tag[i] = bytes[i];
            i += 1;
        }
        Self(tag)
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The name with trailing zero padding removed.
    pub fn name(&self) -> String {
        let end = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl TryFrom<&str> for BlockTag {
    type Error = MarshalError;

    fn try_from(name: &str) -> Result<Self> {
        if name.len() > 4 {
            return Err(MarshalError::InvalidTag(name.to_string()));
        }
        let mut tag = [0u8; 4];
        tag[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self(tag))
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockTag({:?})", self.name())
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Handle for a block whose payload is being written.
///
/// Returned by [`begin_block`]; call [`BlockWriter::finish`] once the payload
/// is complete.
#[must_use = "a block's length field is only written by BlockWriter::finish"]
#[derive(Debug)]
pub struct BlockWriter {
    tag: BlockTag,
    header_offset: usize,
}

/// Write a block header with a placeholder length.
pub fn begin_block(w: &mut ByteWriter<'_>, tag: BlockTag) -> Result<BlockWriter> {
    let header_offset = w.position();
    w.write_bytes(tag.as_bytes())?;
    w.write_u32(0)?;
    tracing::debug!(%tag, offset = header_offset, "Begin block");
    Ok(BlockWriter { tag, header_offset })
}

impl BlockWriter {
    pub fn tag(&self) -> BlockTag {
        self.tag
    }

    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.header_offset + BLOCK_HEADER_SIZE
    }

    /// Patch the length field with the payload size written since
    /// [`begin_block`] and return it.
    pub fn finish(self, w: &mut ByteWriter<'_>) -> Result<u32> {
        let end = w.position();
        let payload = end - self.payload_offset();
        let length = u32::try_from(payload).map_err(|_| MarshalError::CapacityExceeded {
            what: "block payload",
            count: payload,
            capacity: u32::MAX as usize,
        })?;

        w.seek(self.header_offset + 4)?;
        w.write_u32(length)?;
        w.seek(end)?;

        tracing::debug!(tag = %self.tag, length, "Finished block");
        Ok(length)
    }
}

/// Write a whole block: header, payload from `body`, patched length.
pub fn write_block<F>(w: &mut ByteWriter<'_>, tag: BlockTag, body: F) -> Result<u32>
where
    F: FnOnce(&mut ByteWriter<'_>) -> Result<()>,
{
    let block = begin_block(w, tag)?;
    body(w)?;
    block.finish(w)
}

// =============================================================================
// Reading
// =============================================================================

/// A decoded block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub tag: BlockTag,
    /// Declared payload length
    pub length: u32,
    /// Offset of the first payload byte
    pub payload_offset: usize,
}

impl BlockHeader {
    /// Fail with [`MarshalError::UnknownTag`] unless this block is `expected`.
    pub fn expect(&self, expected: BlockTag) -> Result<()> {
        if self.tag != expected {
            return Err(MarshalError::UnknownTag {
                expected,
                found: self.tag,
                offset: self.payload_offset - BLOCK_HEADER_SIZE,
            });
        }
        Ok(())
    }

    /// Offset just past the declared payload.
    pub fn end_offset(&self) -> usize {
        self.payload_offset + self.length as usize
    }

    /// Check that the payload decode consumed exactly the declared length.
    pub fn finish(&self, r: &ByteReader<'_>) -> Result<()> {
        let consumed = r.position() - self.payload_offset;
        if consumed != self.length as usize {
            tracing::error!(
                tag = %self.tag,
                declared = self.length,
                consumed,
                "Block length does not match payload"
            );
            return Err(MarshalError::SizeMismatch {
                what: "block payload",
                expected: self.length as usize,
                actual: consumed,
            });
        }
        Ok(())
    }
}

/// Read a block header.
///
/// The declared length is checked against the configured limit and against the
/// bytes left in the buffer, so a corrupt length fails before any payload is
/// decoded. A length running past the end of the buffer is reported as the
/// same `SizeMismatch` a short or long payload gives.
pub fn read_block_header(r: &mut ByteReader<'_>) -> Result<BlockHeader> {
    let offset = r.position();
    let tag = BlockTag(r.read_array::<4>()?);
    let length = r.read_u32()?;

    let max = r.config().limits.max_block_length;
    if length > max {
        return Err(MarshalError::CapacityExceeded {
            what: "block payload",
            count: length as usize,
            capacity: max as usize,
        });
    }
    if length as usize > r.remaining() {
        tracing::error!(
            %tag,
            declared = length,
            remaining = r.remaining(),
            "Block length runs past end of buffer"
        );
        return Err(MarshalError::SizeMismatch {
            what: "block payload",
            expected: length as usize,
            actual: r.remaining(),
        });
    }

    tracing::debug!(%tag, length, offset, "Read block header");
    Ok(BlockHeader {
        tag,
        length,
        payload_offset: r.position(),
    })
}

/// Read a whole block: header, tag check, payload from `body`, length check.
pub fn read_block<T, F>(r: &mut ByteReader<'_>, expected: BlockTag, body: F) -> Result<T>
where
    F: FnOnce(&mut ByteReader<'_>) -> Result<T>,
{
    let header = read_block_header(r)?;
    header.expect(expected)?;
    let value = body(r)?;
    header.finish(r)?;
    Ok(value)
}

// =============================================================================
// Checksums
// =============================================================================

/// Wrapping sum of every byte.
pub fn byte_sum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(u32::from(b)))
}

/// Append the byte sum of everything written so far. Returns the checksum.
pub fn write_checksum(w: &mut ByteWriter<'_>) -> Result<u32> {
    let sum = byte_sum(&w.as_slice()[..w.position()]);
    w.write_u32(sum)?;
    Ok(sum)
}

/// Check a buffer whose last four bytes are the byte sum of everything before them.
pub fn verify_checksum(bytes: &[u8]) -> Result<()> {
    if bytes.len() < CHECKSUM_SIZE {
        return Err(MarshalError::Underrun {
            offset: 0,
            requested: CHECKSUM_SIZE,
            remaining: bytes.len(),
        });
    }
    let (body, tail) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);
    let stored = ByteReader::new(tail).read_u32()?;
    let computed = byte_sum(body);
    if stored != computed {
        return Err(MarshalError::ChecksumMismatch { stored, computed });
    }
    Ok(())
}
