//! Radar blips

use savewire_core::{
    ArrayKind, ArrayLayout, ByteReader, ByteWriter, FileFormat, FixedRecord, MarshalError,
    PerFormat, Record, Result, require,
};

use crate::Vector3;

const BLIP_SIZE: PerFormat<usize> = PerFormat::uniform(0x28).ps2(0x24).ps2_japan(0x24);

/// Whether the debug sphere radius is stored.
const HAS_DEBUG_RADIUS: PerFormat<bool> = PerFormat::uniform(true).ps2(false).ps2_japan(false);

/// One radar blip slot.
///
/// PS2 builds drop the debug sphere radius, so their blips are four bytes
/// shorter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadarBlip {
    pub color: u32,
    pub blip_type: u32,
    pub entity_handle: i32,
    pub position: Vector3,
    pub index: u16,
    pub dim: bool,
    pub in_use: bool,
    /// Not stored on PS2
    pub debug_sphere_radius: f32,
    pub scale: u16,
    pub display: u16,
    pub sprite: u16,
}

impl Record for RadarBlip {
    const NAME: &'static str = "RadarBlip";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let color = r.read_u32()?;
        let blip_type = r.read_u32()?;
        let entity_handle = r.read_i32()?;
        let position = r.read_record(format)?;
        let index = r.read_u16()?;
        let dim = r.read_bool()?;
        let in_use = r.read_bool()?;
        let debug_sphere_radius = if require(&HAS_DEBUG_RADIUS, Self::NAME, format)? {
            r.read_f32()?
        } else {
            0.0
        };
        let scale = r.read_u16()?;
        let display = r.read_u16()?;
        let sprite = r.read_u16()?;
        r.align(4)?;
        Ok(Self {
            color,
            blip_type,
            entity_handle,
            position,
            index,
            dim,
            in_use,
            debug_sphere_radius,
            scale,
            display,
            sprite,
        })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        w.write_u32(self.color)?;
        w.write_u32(self.blip_type)?;
        w.write_i32(self.entity_handle)?;
        w.write_record(&self.position, format)?;
        w.write_u16(self.index)?;
        w.write_bool(self.dim)?;
        w.write_bool(self.in_use)?;
        if require(&HAS_DEBUG_RADIUS, Self::NAME, format)? {
            w.write_f32(self.debug_sphere_radius)?;
        }
        w.write_u16(self.scale)?;
        w.write_u16(self.display)?;
        w.write_u16(self.sprite)?;
        w.align(4)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::fixed_size(format)
    }
}

impl FixedRecord for RadarBlip {
    fn fixed_size(format: FileFormat) -> Result<usize> {
        require(&BLIP_SIZE, Self::NAME, format)
    }
}

/// The blip table, stored at full capacity.
///
/// Mobile builds have a larger table than the others.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadarBlips {
    pub blips: Vec<RadarBlip>,
}

impl RadarBlips {
    /// A table of empty slots at the capacity of `format`.
    pub fn new(format: FileFormat) -> Result<Self> {
        Ok(Self {
            blips: vec![RadarBlip::default(); Self::capacity(format)?],
        })
    }

    fn capacity(format: FileFormat) -> Result<usize> {
        format
            .array_size(ArrayKind::RadarBlips)
            .ok_or_else(|| MarshalError::unsupported(Self::NAME, format))
    }

    fn layout(format: FileFormat) -> Result<ArrayLayout> {
        Self::capacity(format).map(ArrayLayout::fixed)
    }

    pub fn in_use(&self) -> impl Iterator<Item = &RadarBlip> {
        self.blips.iter().filter(|b| b.in_use)
    }
}

impl Record for RadarBlips {
    const NAME: &'static str = "RadarBlips";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let blips = Self::layout(format)?.read(Self::NAME, r, format)?;
        Ok(Self { blips })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        Self::layout(format)?.write(Self::NAME, &self.blips, w, format)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::layout(format)?.encoded_size::<RadarBlip>(self.blips.len(), format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savewire_core::{from_bytes, to_bytes};

    fn marker() -> RadarBlip {
        RadarBlip {
            color: 0xFF00_00FF,
            blip_type: 2,
            entity_handle: 77,
            position: Vector3::new(5.0, 6.0, 7.0),
            index: 3,
            dim: false,
            in_use: true,
            debug_sphere_radius: 1.5,
            scale: 3,
            display: 3,
            sprite: 0,
        }
    }

    #[test]
    fn test_blip_sizes() {
        assert_eq!(RadarBlip::fixed_size(FileFormat::Pc).unwrap(), 0x28);
        assert_eq!(RadarBlip::fixed_size(FileFormat::Ps2Japan).unwrap(), 0x24);
        for format in FileFormat::ALL {
            let bytes = to_bytes(&marker(), format).unwrap();
            assert_eq!(bytes.len(), RadarBlip::fixed_size(format).unwrap());
        }
    }

    #[test]
    fn test_blip_roundtrip() {
        let pc: RadarBlip = from_bytes(&to_bytes(&marker(), FileFormat::Pc).unwrap(), FileFormat::Pc).unwrap();
        assert_eq!(pc, marker());

        // The radius is not stored on PS2
        let ps2: RadarBlip =
            from_bytes(&to_bytes(&marker(), FileFormat::Ps2).unwrap(), FileFormat::Ps2).unwrap();
        assert_eq!(ps2.debug_sphere_radius, 0.0);
        assert_eq!(ps2.sprite, marker().sprite);
        assert_eq!(ps2.entity_handle, 77);
    }

    #[test]
    fn test_table_capacity_per_format() {
        let blips = RadarBlips {
            blips: vec![marker()],
        };
        assert_eq!(blips.size(FileFormat::Pc).unwrap(), 32 * 0x28);
        assert_eq!(blips.size(FileFormat::Ps2).unwrap(), 32 * 0x24);
        assert_eq!(blips.size(FileFormat::Mobile).unwrap(), 75 * 0x28);

        for format in FileFormat::ALL {
            let bytes = to_bytes(&blips, format).unwrap();
            let decoded: RadarBlips = from_bytes(&bytes, format).unwrap();
            assert_eq!(decoded.in_use().count(), 1);
            assert_eq!(to_bytes(&decoded, format).unwrap(), bytes);
        }
    }

    #[test]
    fn test_full_table_roundtrip() {
        for format in FileFormat::ALL {
            let mut blips = RadarBlips::new(format).unwrap();
            blips.blips[2] = marker();
            let decoded: RadarBlips = from_bytes(&to_bytes(&blips, format).unwrap(), format).unwrap();
            assert_eq!(decoded.blips.len(), format.array_size(ArrayKind::RadarBlips).unwrap());
            if format.is_ps2() {
                assert_eq!(decoded.blips[2].debug_sphere_radius, 0.0);
            } else {
                assert_eq!(decoded, blips);
            }
        }
    }

    #[test]
    fn test_table_overflow() {
        let blips = RadarBlips {
            blips: vec![marker(); 33],
        };
        assert!(matches!(
            to_bytes(&blips, FileFormat::Xbox).unwrap_err(),
            MarshalError::CapacityExceeded { count: 33, capacity: 32, .. }
        ));
        assert!(to_bytes(&blips, FileFormat::Mobile).is_ok());
    }
}
