//! Path node flags
//!
//! Only two flags per path node are saved. They are stored as two bit planes
//! after a node count:
//!
//! ```text
//! count     u32
//! disabled  [u8; ceil(count / 8)]
//! between   [u8; ceil(count / 8)]
//! ```

use savewire_core::bitplane::{self, BitPlanes, FlagRow};
use savewire_core::{ByteReader, ByteWriter, FileFormat, MarshalError, Record, Result};

/// Saved flags of one path node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathNodeFlags {
    /// Node switched off by a script
    pub disabled: bool,
    /// Node links two islands
    pub between_levels: bool,
}

impl FlagRow for PathNodeFlags {
    const COLUMNS: usize = 2;

    fn from_bits(bits: &[bool]) -> Self {
        Self {
            disabled: bits[0],
            between_levels: bits[1],
        }
    }

    fn bit(&self, column: usize) -> bool {
        match column {
            0 => self.disabled,
            1 => self.between_levels,
            _ => false,
        }
    }
}

/// Flags for every path node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathData {
    pub nodes: Vec<PathNodeFlags>,
}

impl Record for PathData {
    const NAME: &'static str = "PathData";

    fn read(r: &mut ByteReader<'_>, _format: FileFormat) -> Result<Self> {
        let count = r.read_u32()? as usize;
        let max = r.config().limits.max_count;
        if count > max {
            return Err(MarshalError::CapacityExceeded {
                what: "path nodes",
                count,
                capacity: max,
            });
        }
        let nodes = bitplane::read_rows(r, count)?;
        Ok(Self { nodes })
    }

    fn write(&self, w: &mut ByteWriter<'_>, _format: FileFormat) -> Result<()> {
        let max = w.config().limits.max_count;
        if self.nodes.len() > max {
            return Err(MarshalError::CapacityExceeded {
                what: "path nodes",
                count: self.nodes.len(),
                capacity: max,
            });
        }
        let count = u32::try_from(self.nodes.len()).map_err(|_| MarshalError::CapacityExceeded {
            what: "path nodes",
            count: self.nodes.len(),
            capacity: u32::MAX as usize,
        })?;
        w.write_u32(count)?;
        bitplane::write_rows(w, &self.nodes)
    }

    fn size(&self, _format: FileFormat) -> Result<usize> {
        Ok(4 + BitPlanes::encoded_len(self.nodes.len(), PathNodeFlags::COLUMNS))
    }
}
