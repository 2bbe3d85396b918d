//! Vehicle pool
//!
//! Each pool entry is a small header followed by the vehicle body:
//!
//! ```text
//! 0x00: kind      u32   0 = automobile, 1 = boat
//! 0x04: model_id  i16
//! 0x06: handle    i32   packed, no alignment
//! 0x0A: body      Automobile or Boat, layout per format
//! ```
//!
//! Bodies begin with the same core fields; everything after them is physics
//! and runtime state that is kept as an opaque span. The span length is what
//! makes body sizes diverge between formats.

use savewire_core::record::require;
use savewire_core::{
    ArrayLayout, ByteReader, ByteWriter, FileFormat, FixedRecord, MarshalError, Opaque, PerFormat,
    Record, Result,
};

use crate::Vector3;

/// Size of an automobile body.
pub const AUTOMOBILE_SIZE: PerFormat<usize> = PerFormat::new(0x5A8, 0x5A8, 0x650, 0x630, 0x5AC);

/// Size of a boat body.
pub const BOAT_SIZE: PerFormat<usize> = PerFormat::new(0x484, 0x484, 0x4FC, 0x4DC, 0x488);

/// Size of the core fields shared by every body.
const CORE_SIZE: PerFormat<usize> = PerFormat::uniform(0x1C).ps2(0x20).ps2_japan(0x20);

/// PS2 builds keep an extra word between flags and health.
const CORE_GAP: PerFormat<usize> = PerFormat::uniform(0).ps2(4).ps2_japan(4);

/// Size of the pool entry header.
pub const ENTRY_HEADER_SIZE: usize = 10;

bitflags::bitflags! {
    /// Vehicle state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VehicleFlags: u32 {
        const ENGINE_ON = 1 << 0;
        const LIGHTS_ON = 1 << 1;
        const SIREN_ON = 1 << 2;
        const TAXI_LIGHT_ON = 1 << 3;
        const MISSION_VEHICLE = 1 << 4;
        const DAMAGED = 1 << 5;
    }
}

/// Stored vehicle discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum VehicleKind {
    Automobile = 0,
    Boat = 1,
}

impl VehicleKind {
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Automobile),
            1 => Some(Self::Boat),
            _ => None,
        }
    }

    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

// =============================================================================
// Core fields
// =============================================================================

/// Fields every vehicle body starts with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleCore {
    pub position: Vector3,
    pub flags: VehicleFlags,
    pub health: f32,
    pub primary_color: u8,
    pub secondary_color: u8,
    pub door_lock: u32,
}

impl Record for VehicleCore {
    const NAME: &'static str = "VehicleCore";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let position = r.read_record(format)?;
        // Unknown bits are kept so the word round-trips
        let flags = VehicleFlags::from_bits_retain(r.read_u32()?);
        r.skip(require(&CORE_GAP, Self::NAME, format)?)?;
        let health = r.read_f32()?;
        let primary_color = r.read_u8()?;
        let secondary_color = r.read_u8()?;
        r.align(4)?;
        let door_lock = r.read_u32()?;
        Ok(Self {
            position,
            flags,
            health,
            primary_color,
            secondary_color,
            door_lock,
        })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        w.write_record(&self.position, format)?;
        w.write_u32(self.flags.bits())?;
        w.skip(require(&CORE_GAP, Self::NAME, format)?)?;
        w.write_f32(self.health)?;
        w.write_u8(self.primary_color)?;
        w.write_u8(self.secondary_color)?;
        w.align(4)?;
        w.write_u32(self.door_lock)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::fixed_size(format)
    }
}

impl FixedRecord for VehicleCore {
    fn fixed_size(format: FileFormat) -> Result<usize> {
        require(&CORE_SIZE, Self::NAME, format)
    }
}

/// Length of the opaque tail after the core fields.
fn physics_len(table: &PerFormat<usize>, name: &'static str, format: FileFormat) -> Result<usize> {
    Ok(require(table, name, format)? - VehicleCore::fixed_size(format)?)
}

// =============================================================================
// Bodies
// =============================================================================

macro_rules! vehicle_body {
    ($ty:ident, $name:literal, $size:ident) => {
        impl Record for $ty {
            const NAME: &'static str = $name;

            fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
                let core = r.read_record(format)?;
                let physics = Opaque::read(r, physics_len(&$size, Self::NAME, format)?)?;
                Ok(Self { core, physics })
            }

            fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
                w.write_record(&self.core, format)?;
                self.physics
                    .write(w, physics_len(&$size, Self::NAME, format)?)
            }

            fn size(&self, format: FileFormat) -> Result<usize> {
                Self::fixed_size(format)
            }
        }

        impl FixedRecord for $ty {
            fn fixed_size(format: FileFormat) -> Result<usize> {
                require(&$size, Self::NAME, format)
            }
        }
    };
}

/// Car body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Automobile {
    pub core: VehicleCore,
    /// Damage, wheel and physics state
    pub physics: Opaque,
}

/// Boat body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boat {
    pub core: VehicleCore,
    pub physics: Opaque,
}

vehicle_body!(Automobile, "Automobile", AUTOMOBILE_SIZE);
vehicle_body!(Boat, "Boat", BOAT_SIZE);

/// The closed set of vehicle bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleBody {
    Automobile(Automobile),
    Boat(Boat),
}

impl Default for VehicleBody {
    fn default() -> Self {
        Self::Automobile(Automobile::default())
    }
}

impl VehicleBody {
    pub fn kind(&self) -> VehicleKind {
        match self {
            Self::Automobile(_) => VehicleKind::Automobile,
            Self::Boat(_) => VehicleKind::Boat,
        }
    }

    pub fn core(&self) -> &VehicleCore {
        match self {
            Self::Automobile(car) => &car.core,
            Self::Boat(boat) => &boat.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut VehicleCore {
        match self {
            Self::Automobile(car) => &mut car.core,
            Self::Boat(boat) => &mut boat.core,
        }
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        match self {
            Self::Automobile(car) => car.size(format),
            Self::Boat(boat) => boat.size(format),
        }
    }
}

// =============================================================================
// Pool entries
// =============================================================================

/// One vehicle pool entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vehicle {
    pub model_id: i16,
    pub handle: i32,
    pub body: VehicleBody,
}

impl Vehicle {
    pub fn kind(&self) -> VehicleKind {
        self.body.kind()
    }
}

impl Record for Vehicle {
    const NAME: &'static str = "Vehicle";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let offset = r.position();
        let raw = r.read_u32()?;
        let kind = VehicleKind::from_u32(raw).ok_or(MarshalError::InvalidValue {
            what: "VehicleKind",
            value: raw,
            offset,
        })?;
        let model_id = r.read_i16()?;
        let handle = r.read_i32()?;
        let body = match kind {
            VehicleKind::Automobile => VehicleBody::Automobile(r.read_record(format)?),
            VehicleKind::Boat => VehicleBody::Boat(r.read_record(format)?),
        };
        Ok(Self {
            model_id,
            handle,
            body,
        })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        w.write_u32(self.kind().as_u32())?;
        w.write_i16(self.model_id)?;
        w.write_i32(self.handle)?;
        match &self.body {
            VehicleBody::Automobile(car) => w.write_record(car, format),
            VehicleBody::Boat(boat) => w.write_record(boat, format),
        }
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Ok(ENTRY_HEADER_SIZE + self.body.size(format)?)
    }
}

/// Count-prefixed list of vehicles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehiclePool {
    pub vehicles: Vec<Vehicle>,
}

impl VehiclePool {
    const LAYOUT: ArrayLayout = ArrayLayout::counted();

    pub fn count_of(&self, kind: VehicleKind) -> usize {
        self.vehicles.iter().filter(|v| v.kind() == kind).count()
    }
}

impl Record for VehiclePool {
    const NAME: &'static str = "VehiclePool";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let vehicles = Self::LAYOUT.read(Self::NAME, r, format)?;
        tracing::debug!(count = vehicles.len(), %format, "Read vehicle pool");
        Ok(Self { vehicles })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        Self::LAYOUT.write(Self::NAME, &self.vehicles, w, format)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::LAYOUT.size_of(&self.vehicles, format)
    }
}
