//! Pickups
//!
//! The pickup block is a table stored at full capacity no matter how many
//! pickups exist, followed by a ring of recently collected pickup handles:
//!
//! ```text
//! pickups          [Pickup; 336]
//! collected_index  u16           next slot to overwrite in the ring
//! padding          u16
//! collected        [i32; 20]
//! ```

use savewire_core::{
    ArrayKind, ArrayLayout, ByteReader, ByteWriter, FileFormat, FixedRecord, MarshalError, Record,
    Result,
};

use crate::Vector3;

/// One pickup slot, `0x20` bytes in every format.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pickup {
    pub position: Vector3,
    pub value: f32,
    pub object_handle: i32,
    pub regeneration_time: u32,
    pub model_index: i16,
    pub quantity: u16,
    /// Pickup type; zero marks an empty slot
    pub kind: u8,
    pub picked_up: bool,
    pub visible: bool,
}

impl Pickup {
    pub const SIZE: usize = 0x20;

    pub fn is_empty(&self) -> bool {
        self.kind == 0
    }
}

impl Record for Pickup {
    const NAME: &'static str = "Pickup";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let position = r.read_record(format)?;
        let value = r.read_f32()?;
        let object_handle = r.read_i32()?;
        let regeneration_time = r.read_u32()?;
        let model_index = r.read_i16()?;
        let quantity = r.read_u16()?;
        let kind = r.read_u8()?;
        let picked_up = r.read_bool()?;
        let visible = r.read_bool()?;
        r.align(4)?;
        Ok(Self {
            position,
            value,
            object_handle,
            regeneration_time,
            model_index,
            quantity,
            kind,
            picked_up,
            visible,
        })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        w.write_record(&self.position, format)?;
        w.write_f32(self.value)?;
        w.write_i32(self.object_handle)?;
        w.write_u32(self.regeneration_time)?;
        w.write_i16(self.model_index)?;
        w.write_u16(self.quantity)?;
        w.write_u8(self.kind)?;
        w.write_bool(self.picked_up)?;
        w.write_bool(self.visible)?;
        w.align(4)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::fixed_size(format)
    }
}

impl FixedRecord for Pickup {
    fn fixed_size(_format: FileFormat) -> Result<usize> {
        Ok(Self::SIZE)
    }
}

/// The pickup table and the collected ring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickupPool {
    /// Every slot of the table, empty ones included
    pub pickups: Vec<Pickup>,
    /// Ring write position, always below the ring capacity
    pub collected_index: u16,
    pub collected: Vec<i32>,
}

fn capacity(kind: ArrayKind, format: FileFormat) -> Result<usize> {
    format
        .array_size(kind)
        .ok_or_else(|| MarshalError::unsupported(PickupPool::NAME, format))
}

impl PickupPool {
    /// An empty pool with every slot present for `format`.
    pub fn new(format: FileFormat) -> Result<Self> {
        Ok(Self {
            pickups: vec![Pickup::default(); capacity(ArrayKind::Pickups, format)?],
            collected_index: 0,
            collected: vec![0; capacity(ArrayKind::CollectedPickups, format)?],
        })
    }

    /// Slots that hold a pickup.
    pub fn active(&self) -> impl Iterator<Item = (usize, &Pickup)> {
        self.pickups.iter().enumerate().filter(|(_, p)| !p.is_empty())
    }

    /// Record a collected pickup handle, advancing the ring.
    pub fn push_collected(&mut self, handle: i32) {
        if self.collected.is_empty() {
            return;
        }
        let slot = self.collected_index as usize % self.collected.len();
        self.collected[slot] = handle;
        self.collected_index = ((slot + 1) % self.collected.len()) as u16;
    }

    fn check_collected_index(&self, capacity: usize) -> Result<()> {
        if self.collected_index as usize >= capacity {
            return Err(MarshalError::CapacityExceeded {
                what: "collected pickup index",
                count: self.collected_index as usize,
                capacity,
            });
        }
        Ok(())
    }

    fn layouts(format: FileFormat) -> Result<(ArrayLayout, ArrayLayout)> {
        Ok((
            ArrayLayout::fixed(capacity(ArrayKind::Pickups, format)?),
            ArrayLayout::fixed(capacity(ArrayKind::CollectedPickups, format)?),
        ))
    }
}

impl Record for PickupPool {
    const NAME: &'static str = "PickupPool";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let (table, ring) = Self::layouts(format)?;
        let pickups = table.read("pickups", r, format)?;
        let collected_index = r.read_u16()?;
        r.skip(2)?;
        let collected: Vec<i32> = ring.read("collected pickups", r, format)?;

        let pool = Self {
            pickups,
            collected_index,
            collected,
        };
        pool.check_collected_index(pool.collected.len())?;
        Ok(pool)
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        let (table, ring) = Self::layouts(format)?;
        self.check_collected_index(capacity(ArrayKind::CollectedPickups, format)?)?;
        table.write("pickups", &self.pickups, w, format)?;
        w.write_u16(self.collected_index)?;
        w.skip(2)?;
        ring.write("collected pickups", &self.collected, w, format)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        let (table, ring) = Self::layouts(format)?;
        Ok(table.encoded_size::<Pickup>(self.pickups.len(), format)?
            + 4
            + ring.encoded_size::<i32>(self.collected.len(), format)?)
    }
}
