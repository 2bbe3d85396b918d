//! Multi-block save buffers built from the sample records

mod common;

use savewire_core::{
    BlockTag, ByteReader, ByteWriter, FileFormat, FixedRecord, MarshalError, Opaque, read_block,
    verify_checksum, write_block, write_checksum,
};
use savewire_records::{
    Automobile, Boat, ParticleObject, ParticleObjects, PathData, PathNodeFlags, PickupPool,
    RadarBlip, RadarBlips, Vector3, Vehicle, VehicleBody, VehicleCore, VehicleFlags, VehiclePool,
};

use common::init_tracing;

const VEHICLES: BlockTag = BlockTag::new("VEH");
const PICKUPS: BlockTag = BlockTag::new("PICK");
const RADAR: BlockTag = BlockTag::new("RDR");
const PATHS: BlockTag = BlockTag::new("PATH");
const PARTICLES: BlockTag = BlockTag::new("PART");

#[derive(Debug, Clone, PartialEq)]
struct Save {
    vehicles: VehiclePool,
    pickups: PickupPool,
    radar: RadarBlips,
    paths: PathData,
    particles: ParticleObjects,
}

fn sample_save(format: FileFormat) -> Save {
    let core = VehicleCore {
        position: Vector3::new(-1.5, 800.0, 14.75),
        flags: VehicleFlags::ENGINE_ON | VehicleFlags::MISSION_VEHICLE,
        health: 650.0,
        primary_color: 1,
        secondary_color: 2,
        door_lock: 1,
    };
    let car_len =
        Automobile::fixed_size(format).unwrap() - VehicleCore::fixed_size(format).unwrap();

    let mut pickups = PickupPool::new(format).unwrap();
    pickups.pickups[4].kind = 2;
    pickups.pickups[4].quantity = 60;
    pickups.push_collected(0x1001);

    // PS2 files carry no debug radius, so leave it at zero
    let mut radar = RadarBlips::new(format).unwrap();
    radar.blips[0] = RadarBlip {
        color: 5,
        in_use: true,
        entity_handle: 0x2A01,
        ..RadarBlip::default()
    };

    Save {
        vehicles: VehiclePool {
            vehicles: vec![
                Vehicle {
                    model_id: 90,
                    handle: 0x2A01,
                    body: VehicleBody::Automobile(Automobile {
                        core,
                        physics: Opaque::from_vec((0..car_len).map(|i| i as u8).collect()),
                    }),
                },
                Vehicle {
                    model_id: 136,
                    handle: 0x2B01,
                    body: VehicleBody::Boat(Boat {
                        core,
                        physics: Opaque::default(),
                    }),
                },
            ],
        },
        pickups,
        radar,
        paths: PathData {
            nodes: (0..37)
                .map(|i| PathNodeFlags {
                    disabled: i % 5 == 0,
                    between_levels: i > 30,
                })
                .collect(),
        },
        particles: ParticleObjects {
            objects: vec![ParticleObject {
                object_type: 3,
                active: true,
                ..ParticleObject::default()
            }],
        },
    }
}

fn encode_save(save: &Save, format: FileFormat) -> Vec<u8> {
    let mut w = ByteWriter::new();
    write_block(&mut w, VEHICLES, |w| w.write_record(&save.vehicles, format)).unwrap();
    write_block(&mut w, PICKUPS, |w| w.write_record(&save.pickups, format)).unwrap();
    write_block(&mut w, RADAR, |w| w.write_record(&save.radar, format)).unwrap();
    write_block(&mut w, PATHS, |w| w.write_record(&save.paths, format)).unwrap();
    write_block(&mut w, PARTICLES, |w| w.write_record(&save.particles, format)).unwrap();
    write_checksum(&mut w).unwrap();
    w.into_vec()
}

fn decode_save(bytes: &[u8], format: FileFormat) -> Result<Save, MarshalError> {
    verify_checksum(bytes)?;
    let mut r = ByteReader::new(bytes);
    Ok(Save {
        vehicles: read_block(&mut r, VEHICLES, |r| r.read_record(format))?,
        pickups: read_block(&mut r, PICKUPS, |r| r.read_record(format))?,
        radar: read_block(&mut r, RADAR, |r| r.read_record(format))?,
        paths: read_block(&mut r, PATHS, |r| r.read_record(format))?,
        particles: read_block(&mut r, PARTICLES, |r| r.read_record(format))?,
    })
}

#[test]
fn test_save_roundtrip_every_format() {
    init_tracing();
    for format in FileFormat::ALL {
        let save = sample_save(format);
        let bytes = encode_save(&save, format);

        let decoded = decode_save(&bytes, format).unwrap();
        assert_eq!(decoded, save, "{format}");
        assert_eq!(decoded.radar.in_use().count(), 1);

        assert_eq!(encode_save(&decoded, format), bytes, "{format}");
    }
}

#[test]
fn test_vehicle_block_length_per_format() {
    for (format, body) in [
        (FileFormat::Pc, 0x5A8),
        (FileFormat::Xbox, 0x5A8),
        (FileFormat::Ps2, 0x650),
        (FileFormat::Ps2Japan, 0x630),
        (FileFormat::Mobile, 0x5AC),
    ] {
        let pool = VehiclePool {
            vehicles: vec![Vehicle::default()],
        };
        let mut w = ByteWriter::new();
        let length = write_block(&mut w, VEHICLES, |w| w.write_record(&pool, format)).unwrap();
        assert_eq!(length as usize, 4 + 10 + body);
        assert_eq!(w.position(), 8 + 4 + 10 + body);
    }
}

#[test]
fn test_blocks_out_of_order() {
    let format = FileFormat::Pc;
    let save = sample_save(format);
    let mut w = ByteWriter::new();
    write_block(&mut w, PATHS, |w| w.write_record(&save.paths, format)).unwrap();
    let bytes = w.into_vec();

    let err = read_block(&mut ByteReader::new(&bytes), VEHICLES, |r| {
        r.read_record::<VehiclePool>(format)
    })
    .unwrap_err();
    assert_eq!(
        err,
        MarshalError::UnknownTag {
            expected: VEHICLES,
            found: PATHS,
            offset: 0
        }
    );
}

#[test]
fn test_corrupt_block_length() {
    init_tracing();
    let format = FileFormat::Ps2;
    let save = sample_save(format);
    let clean = encode_save(&save, format);

    // Pickup block header follows the vehicle block
    let pickup_header = 8 + u32::from_le_bytes(clean[4..8].try_into().unwrap()) as usize;
    assert_eq!(&clean[pickup_header..pickup_header + 4], b"PICK");

    for delta in [-1i64, 1] {
        let mut bytes = clean.clone();
        let at = pickup_header + 4;
        let length = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
        let patched = (i64::from(length) + delta) as u32;
        bytes[at..at + 4].copy_from_slice(&patched.to_le_bytes());

        let mut r = ByteReader::new(&bytes);
        read_block(&mut r, VEHICLES, |r| r.read_record::<VehiclePool>(format)).unwrap();
        let err = read_block(&mut r, PICKUPS, |r| r.read_record::<PickupPool>(format)).unwrap_err();
        assert!(
            matches!(err, MarshalError::SizeMismatch { what: "block payload", .. }),
            "delta {delta}: {err}"
        );
    }
}

#[test]
fn test_corrupt_final_block_length() {
    init_tracing();
    let format = FileFormat::Xbox;
    let save = sample_save(format);
    let mut w = ByteWriter::new();
    write_block(&mut w, VEHICLES, |w| w.write_record(&save.vehicles, format)).unwrap();
    let last = w.position();
    write_block(&mut w, PARTICLES, |w| w.write_record(&save.particles, format)).unwrap();
    let clean = w.into_vec();
    assert_eq!(&clean[last..last + 4], b"PART");

    for delta in [-1i64, 1] {
        let mut bytes = clean.clone();
        let at = last + 4;
        let length = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
        let patched = (i64::from(length) + delta) as u32;
        bytes[at..at + 4].copy_from_slice(&patched.to_le_bytes());

        let mut r = ByteReader::new(&bytes);
        read_block(&mut r, VEHICLES, |r| r.read_record::<VehiclePool>(format)).unwrap();
        let err = read_block(&mut r, PARTICLES, |r| r.read_record::<ParticleObjects>(format))
            .unwrap_err();
        assert!(
            matches!(err, MarshalError::SizeMismatch { what: "block payload", .. }),
            "delta {delta}: {err}"
        );
    }
}

#[test]
fn test_checksum_detects_flipped_byte() {
    let format = FileFormat::Mobile;
    let mut bytes = encode_save(&sample_save(format), format);
    bytes[20] ^= 0x01;
    assert!(matches!(
        decode_save(&bytes, format).unwrap_err(),
        MarshalError::ChecksumMismatch { .. }
    ));
}

#[test]
fn test_format_mismatch_is_detected() {
    // A PC save read as PS2 runs out of step at the first vehicle
    let bytes = encode_save(&sample_save(FileFormat::Pc), FileFormat::Pc);
    assert!(decode_save(&bytes, FileFormat::Ps2).is_err());
}
