//! Shared types for the savewire save-file marshaling crates.
//!
//! - [`FileFormat`] - the platform/region variant threaded through every call
//! - [`PerFormat`] - per-variant value tables used by record layouts
//! - [`ArrayKind`] - shared fixed-size tables whose capacity depends on the variant

pub mod format;

pub use format::{ArrayKind, FileFormat, ParseFormatError, PerFormat};
