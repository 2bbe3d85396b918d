//! Savewire Records - sample save record schemas
//!
//! A handful of real layouts from the game's save blocks, enough to exercise
//! every codec in `savewire-core` under every format variant:
//!
//! - [`vehicle`] - Vehicle pool entries, a closed sum type selected by a stored kind
//! - [`pickup`] - Pickup table at fixed capacity plus the collected ring
//! - [`radar`] - Radar blip table, sized per format
//! - [`path`] - Path node flags stored as bit planes
//! - [`particle`] - Particle objects, stored with one spare slot

pub mod particle;
pub mod path;
pub mod pickup;
pub mod radar;
pub mod vehicle;

use bytemuck::{Pod, Zeroable};
use savewire_core::{ByteReader, ByteWriter, FileFormat, FixedRecord, Record, Result};

pub use particle::{ParticleObject, ParticleObjects};
pub use path::{PathData, PathNodeFlags};
pub use pickup::{Pickup, PickupPool};
pub use radar::{RadarBlip, RadarBlips};
pub use vehicle::{Automobile, Boat, Vehicle, VehicleBody, VehicleCore, VehicleFlags, VehicleKind, VehiclePool};

/// World-space position, stored as three consecutive `f32`s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<glam::Vec3> for Vector3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for glam::Vec3 {
    fn from(v: Vector3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

impl Record for Vector3 {
    const NAME: &'static str = "Vector3";

    fn read(r: &mut ByteReader<'_>, _format: FileFormat) -> Result<Self> {
        r.read_pod()
    }

    fn write(&self, w: &mut ByteWriter<'_>, _format: FileFormat) -> Result<()> {
        w.write_pod(self)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::fixed_size(format)
    }
}

impl FixedRecord for Vector3 {
    fn fixed_size(_format: FileFormat) -> Result<usize> {
        Ok(std::mem::size_of::<Self>())
    }
}
