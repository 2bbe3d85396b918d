//! Savewire Core - binary marshaling for game save data
//!
//! Save files are flat little-endian byte buffers whose layouts differ between
//! the platform builds of the game. This crate provides the pieces every
//! record schema is built from.
//!
//! # Architecture
//!
//! - [`ByteReader`] / [`ByteWriter`] - Positioned cursors over in-memory buffers
//! - [`Record`] - Per-format read/write/size contract, checked by [`decode`] and [`encode`]
//! - [`block`] - Tagged, length-prefixed block framing and checksums
//! - [`ArrayLayout`] - Count-prefixed, fixed-capacity and over-allocated arrays
//! - [`BitPlanes`] - Boolean matrices stored one bit plane per column
//! - [`CodecConfig`] - Fill bytes, sanity limits and trace logging
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod array;
pub mod bitplane;
pub mod block;
pub mod config;
pub mod cursor;
pub mod error;
pub mod record;
#[cfg(test)]
pub mod test_utils;

pub use array::ArrayLayout;
pub use bitplane::{BitPlanes, FlagRow, plane_len, read_rows, write_rows};
pub use block::{
    BLOCK_HEADER_SIZE, BlockHeader, BlockTag, BlockWriter, begin_block, byte_sum,
    read_block, read_block_header, verify_checksum, write_block, write_checksum,
};
pub use config::{CodecConfig, LimitsConfig, LoggingConfig, PaddingConfig};
pub use cursor::{ByteReader, ByteWriter};
pub use error::{MarshalError, Result};
pub use record::{FixedRecord, Opaque, Record, decode, encode, from_bytes, require, to_bytes};

// Re-export format types so schemas only need this crate
pub use savewire_shared::{ArrayKind, FileFormat, PerFormat};
