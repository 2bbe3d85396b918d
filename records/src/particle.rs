//! Particle objects
//!
//! The game writes one more object than it counts. The extra slot is an
//! empty object; readers consume it and drop it.

use savewire_core::{
    ArrayLayout, ByteReader, ByteWriter, FileFormat, FixedRecord, MarshalError, Opaque, PerFormat,
    Record, Result, require,
};

use crate::Vector3;

const OBJECT_SIZE: PerFormat<usize> = PerFormat::new(0x88, 0x88, 0x80, 0x80, 0x8C);

/// Bytes decoded as fields before the emitter state.
const HEADER_SIZE: usize = 0x1C;

/// A persistent particle emitter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleObject {
    pub position: Vector3,
    pub object_type: u16,
    pub state: u8,
    pub active: bool,
    pub creation_time: u32,
    pub lifetime: u32,
    pub color: u32,
    /// Emitter runtime state
    pub emitter: Opaque,
}

fn emitter_len(format: FileFormat) -> Result<usize> {
    Ok(require(&OBJECT_SIZE, ParticleObject::NAME, format)? - HEADER_SIZE)
}

impl Record for ParticleObject {
    const NAME: &'static str = "ParticleObject";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        Ok(Self {
            position: r.read_record(format)?,
            object_type: r.read_u16()?,
            state: r.read_u8()?,
            active: r.read_bool()?,
            creation_time: r.read_u32()?,
            lifetime: r.read_u32()?,
            color: r.read_u32()?,
            emitter: Opaque::read(r, emitter_len(format)?)?,
        })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        w.write_record(&self.position, format)?;
        w.write_u16(self.object_type)?;
        w.write_u8(self.state)?;
        w.write_bool(self.active)?;
        w.write_u32(self.creation_time)?;
        w.write_u32(self.lifetime)?;
        w.write_u32(self.color)?;
        self.emitter.write(w, emitter_len(format)?)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Self::fixed_size(format)
    }
}

impl FixedRecord for ParticleObject {
    fn fixed_size(format: FileFormat) -> Result<usize> {
        require(&OBJECT_SIZE, Self::NAME, format)
    }
}

fn check_count(count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(MarshalError::CapacityExceeded {
            what: ParticleObjects::NAME,
            count,
            capacity: max,
        });
    }
    Ok(())
}

/// Count followed by `count + 1` objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleObjects {
    pub objects: Vec<ParticleObject>,
}

impl Record for ParticleObjects {
    const NAME: &'static str = "ParticleObjects";

    fn read(r: &mut ByteReader<'_>, format: FileFormat) -> Result<Self> {
        let count = r.read_u32()? as usize;
        check_count(count, r.config().limits.max_count)?;
        let objects = ArrayLayout::over_allocated(count).read(Self::NAME, r, format)?;
        Ok(Self { objects })
    }

    fn write(&self, w: &mut ByteWriter<'_>, format: FileFormat) -> Result<()> {
        let count = self.objects.len();
        check_count(count, w.config().limits.max_count)?;
        let stored = u32::try_from(count).map_err(|_| MarshalError::CapacityExceeded {
            what: Self::NAME,
            count,
            capacity: u32::MAX as usize,
        })?;
        w.write_u32(stored)?;
        ArrayLayout::over_allocated(count).write(Self::NAME, &self.objects, w, format)
    }

    fn size(&self, format: FileFormat) -> Result<usize> {
        Ok(4 + ArrayLayout::over_allocated(self.objects.len())
            .encoded_size::<ParticleObject>(self.objects.len(), format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savewire_core::{CodecConfig, from_bytes, to_bytes};

    fn smoke(format: FileFormat, seed: u8) -> ParticleObject {
        let len = emitter_len(format).unwrap();
        ParticleObject {
            position: Vector3::new(10.0, 20.0, f32::from(seed)),
            object_type: 14,
            state: 1,
            active: true,
            creation_time: 1_000 * u32::from(seed),
            lifetime: 5_000,
            color: 0x8080_80FF,
            emitter: Opaque::from_vec(vec![seed; len]),
        }
    }

    #[test]
    fn test_object_sizes() {
        assert_eq!(ParticleObject::fixed_size(FileFormat::Pc).unwrap(), 0x88);
        assert_eq!(ParticleObject::fixed_size(FileFormat::Ps2).unwrap(), 0x80);
        assert_eq!(ParticleObject::fixed_size(FileFormat::Mobile).unwrap(), 0x8C);
        for format in FileFormat::ALL {
            assert_eq!(
                to_bytes(&smoke(format, 1), format).unwrap().len(),
                ParticleObject::fixed_size(format).unwrap()
            );
        }
    }

    #[test]
    fn test_spare_slot_written_and_dropped() {
        for format in FileFormat::ALL {
            let size = ParticleObject::fixed_size(format).unwrap();
            let list = ParticleObjects {
                objects: vec![smoke(format, 1), smoke(format, 2), smoke(format, 3)],
            };

            let bytes = to_bytes(&list, format).unwrap();
            assert_eq!(&bytes[..4], &3u32.to_le_bytes());
            assert_eq!(bytes.len(), 4 + 4 * size);
            assert!(bytes[4 + 3 * size..].iter().all(|&b| b == 0));

            let mut r = ByteReader::new(&bytes);
            let decoded: ParticleObjects = r.read_record(format).unwrap();
            assert_eq!(decoded, list);
            assert_eq!(r.position(), 4 + (3 + 1) * size);
        }
    }

    #[test]
    fn test_empty_list_still_has_spare() {
        let list = ParticleObjects::default();
        let bytes = to_bytes(&list, FileFormat::Ps2Japan).unwrap();
        assert_eq!(bytes.len(), 4 + 0x80);
        let decoded: ParticleObjects = from_bytes(&bytes, FileFormat::Ps2Japan).unwrap();
        assert!(decoded.objects.is_empty());
    }

    #[test]
    fn test_truncated_spare() {
        let list = ParticleObjects {
            objects: vec![smoke(FileFormat::Pc, 1)],
        };
        let bytes = to_bytes(&list, FileFormat::Pc).unwrap();
        let err = from_bytes::<ParticleObjects>(&bytes[..bytes.len() - 1], FileFormat::Pc).unwrap_err();
        assert!(matches!(err, MarshalError::Underrun { .. }));
    }

    #[test]
    fn test_default_object_roundtrip() {
        for format in FileFormat::ALL {
            let list = ParticleObjects {
                objects: vec![ParticleObject::default()],
            };
            let bytes = to_bytes(&list, format).unwrap();
            let decoded: ParticleObjects = from_bytes(&bytes, format).unwrap();
            assert_eq!(decoded.objects[0].emitter.len(), emitter_len(format).unwrap());
            assert_eq!(decoded, list, "{format}");
        }
    }

    #[test]
    fn test_count_limit_checked_before_write() {
        let mut config = CodecConfig::default();
        config.limits.max_count = 1;
        let list = ParticleObjects {
            objects: vec![smoke(FileFormat::Xbox, 1), smoke(FileFormat::Xbox, 2)],
        };

        let mut w = ByteWriter::new().with_config(&config);
        let err = w.write_record(&list, FileFormat::Xbox).unwrap_err();
        assert_eq!(
            err,
            MarshalError::CapacityExceeded {
                what: "ParticleObjects",
                count: 2,
                capacity: 1
            }
        );
        assert_eq!(w.position(), 0);

        // What the writer refuses, the reader refuses too
        let bytes = to_bytes(&list, FileFormat::Xbox).unwrap();
        let mut r = ByteReader::new(&bytes).with_config(&config);
        assert!(matches!(
            r.read_record::<ParticleObjects>(FileFormat::Xbox).unwrap_err(),
            MarshalError::CapacityExceeded { count: 2, capacity: 1, .. }
        ));
    }
}
