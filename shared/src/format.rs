//! Save-file format variants.
//!
//! This module is the single source of truth for everything that differs
//! between platform/region builds of the game: the [`FileFormat`] value itself,
//! the [`PerFormat`] table type records use to declare their per-variant byte
//! sizes, and the shared capacity tables behind [`FileFormat::array_size`].
//!
//! Record code never branches on the variant directly. A layout that differs
//! between variants is expressed as a `PerFormat` table (or an [`ArrayKind`]
//! lookup), so adding a variant touches this file plus each record's tables.
//!
//! # Example
//!
//! ```
//! use savewire_shared::{ArrayKind, FileFormat, PerFormat};
//!
//! const BLIP_SIZE: PerFormat<usize> = PerFormat::uniform(0x30);
//!
//! assert_eq!(BLIP_SIZE.get(FileFormat::Ps2Japan), Some(0x30));
//! assert_eq!(FileFormat::Pc.array_size(ArrayKind::Pickups), Some(336));
//! assert!(FileFormat::Ps2Japan.is_ps2());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform/region variant of a save file.
///
/// Exactly one variant is active for a decode/encode pass. It is passed by
/// value through every call, so it cannot change mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FileFormat {
    /// Windows PC release
    #[default]
    Pc,
    /// Original Xbox release
    Xbox,
    /// PlayStation 2, all regions except Japan
    Ps2,
    /// PlayStation 2, Japanese release
    Ps2Japan,
    /// iOS / Android release
    Mobile,
}

impl FileFormat {
    /// Every variant, in declaration order.
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Pc,
        FileFormat::Xbox,
        FileFormat::Ps2,
        FileFormat::Ps2Japan,
        FileFormat::Mobile,
    ];

    /// Short lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            FileFormat::Pc => "pc",
            FileFormat::Xbox => "xbox",
            FileFormat::Ps2 => "ps2",
            FileFormat::Ps2Japan => "ps2-japan",
            FileFormat::Mobile => "mobile",
        }
    }

    pub const fn is_pc(self) -> bool {
        matches!(self, FileFormat::Pc)
    }

    pub const fn is_xbox(self) -> bool {
        matches!(self, FileFormat::Xbox)
    }

    /// True for both PS2 releases.
    pub const fn is_ps2(self) -> bool {
        matches!(self, FileFormat::Ps2 | FileFormat::Ps2Japan)
    }

    pub const fn is_japanese(self) -> bool {
        matches!(self, FileFormat::Ps2Japan)
    }

    pub const fn is_mobile(self) -> bool {
        matches!(self, FileFormat::Mobile)
    }

    /// True for Xbox and both PS2 releases.
    pub const fn is_console(self) -> bool {
        self.is_xbox() || self.is_ps2()
    }

    /// Storage capacity of a shared fixed-size table under this variant.
    ///
    /// Returns `None` when the variant has no layout for `kind`.
    pub const fn array_size(self, kind: ArrayKind) -> Option<usize> {
        kind.capacities().get(self)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown save format: {0:?} (expected pc, xbox, ps2, ps2-japan or mobile)")]
pub struct ParseFormatError(pub String);

impl FromStr for FileFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pc" => Ok(FileFormat::Pc),
            "xbox" => Ok(FileFormat::Xbox),
            "ps2" => Ok(FileFormat::Ps2),
            "ps2-japan" | "ps2j" | "ps2_japan" => Ok(FileFormat::Ps2Japan),
            "mobile" => Ok(FileFormat::Mobile),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

// =============================================================================
// Per-variant tables
// =============================================================================

/// One optional value per [`FileFormat`].
///
/// Records declare their byte sizes (and any variant-dependent gap or field
/// width) with a `const` table of this type. A missing entry means the record
/// has no layout for that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerFormat<T> {
    pub pc: Option<T>,
    pub xbox: Option<T>,
    pub ps2: Option<T>,
    pub ps2_japan: Option<T>,
    pub mobile: Option<T>,
}

impl<T: Copy> PerFormat<T> {
    /// Table with no entries. Use the builder methods to fill it.
    pub const fn empty() -> Self {
        Self {
            pc: None,
            xbox: None,
            ps2: None,
            ps2_japan: None,
            mobile: None,
        }
    }

    /// Same value for every variant.
    pub const fn uniform(value: T) -> Self {
        Self {
            pc: Some(value),
            xbox: Some(value),
            ps2: Some(value),
            ps2_japan: Some(value),
            mobile: Some(value),
        }
    }

    /// Table with an explicit value for every variant.
    pub const fn new(pc: T, xbox: T, ps2: T, ps2_japan: T, mobile: T) -> Self {
        Self {
            pc: Some(pc),
            xbox: Some(xbox),
            ps2: Some(ps2),
            ps2_japan: Some(ps2_japan),
            mobile: Some(mobile),
        }
    }

    pub const fn pc(mut self, value: T) -> Self {
        self.pc = Some(value);
        self
    }

    pub const fn xbox(mut self, value: T) -> Self {
        self.xbox = Some(value);
        self
    }

    pub const fn ps2(mut self, value: T) -> Self {
        self.ps2 = Some(value);
        self
    }

    pub const fn ps2_japan(mut self, value: T) -> Self {
        self.ps2_japan = Some(value);
        self
    }

    pub const fn mobile(mut self, value: T) -> Self {
        self.mobile = Some(value);
        self
    }

    /// Value for `format`, if the table defines one.
    pub const fn get(&self, format: FileFormat) -> Option<T> {
        match format {
            FileFormat::Pc => self.pc,
            FileFormat::Xbox => self.xbox,
            FileFormat::Ps2 => self.ps2,
            FileFormat::Ps2Japan => self.ps2_japan,
            FileFormat::Mobile => self.mobile,
        }
    }

    /// True if every variant has an entry.
    pub const fn is_complete(&self) -> bool {
        self.pc.is_some()
            && self.xbox.is_some()
            && self.ps2.is_some()
            && self.ps2_japan.is_some()
            && self.mobile.is_some()
    }
}

/// Shared fixed-size tables whose storage capacity depends on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// World pickup slots
    Pickups,
    /// Ring of recently collected pickup handles
    CollectedPickups,
    /// Radar blip slots
    RadarBlips,
    /// Garage slots
    Garages,
    /// Per-model streaming flags
    StreamingModels,
}

impl ArrayKind {
    const fn capacities(self) -> PerFormat<usize> {
        match self {
            ArrayKind::Pickups => PerFormat::uniform(336),
            ArrayKind::CollectedPickups => PerFormat::uniform(20),
            ArrayKind::RadarBlips => PerFormat::uniform(32).mobile(75),
            ArrayKind::Garages => PerFormat::uniform(32),
            ArrayKind::StreamingModels => PerFormat::uniform(200).mobile(250),
        }
    }
}
