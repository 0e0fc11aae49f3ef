use crate::{
    ComponentId, DensityUnit, ErrorKind, Jpeg, Marker, ParseOptions, RestartMarkers, TableClass,
};

// Default Luminance DC table.
const DC_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const DC_VALUES: [u8; 12] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
];

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let len = u16::try_from(payload.len() + 2).unwrap();
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn dqt(tables: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    for &tq in tables {
        payload.push(tq);
        payload.extend((1..=64).map(|q| q + tq));
    }
    segment(0xDB, &payload)
}

fn dht(tables: &[(u8, u8)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for &(tc, th) in tables {
        payload.push(tc << 4 | th);
        payload.extend_from_slice(&DC_COUNTS);
        payload.extend_from_slice(&DC_VALUES);
    }
    segment(0xC4, &payload)
}

/// A structurally complete baseline JPEG, 4:2:0 with a restart interval of 2 MCUs.
fn baseline() -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    out.extend(segment(
        0xE0,
        &[
            b'J', b'F', b'I', b'F', 0, // identifier
            1, 2, // version
            1, // unit
            0x00, 0x60, 0x00, 0x60, // density
            0, 0, // thumbnail
        ],
    ));
    out.extend(segment(0xFE, b"synthetic"));
    out.extend(dqt(&[0, 1]));
    out.extend(segment(
        0xC0,
        &[8, 0x00, 0x30, 0x00, 0x20, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1],
    ));
    out.extend(dht(&[(0, 0), (1, 0), (0, 1), (1, 1)]));
    out.extend(segment(0xDD, &[0x00, 0x02]));
    out.extend(segment(0xDA, &[3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0]));
    out.extend([
        0xA1, 0xFF, 0x00, 0xB2, // interval 0
        0xFF, 0xD0, // RST0
        0xC3, 0xD4, // interval 1
        0xFF, 0xD1, // RST1
        0xE5, // interval 2
    ]);
    out.extend([0xFF, 0xD9]);
    out
}

#[test]
fn parse_baseline() {
    let data = baseline();
    let jpeg = Jpeg::parse(&data).unwrap();

    let jfif = jpeg.jfif().unwrap();
    assert_eq!((jfif.major_version(), jfif.minor_version()), (1, 2));
    assert_eq!(jfif.unit(), DensityUnit::PixelsPerInch);
    assert_eq!((jfif.density_x(), jfif.density_y()), (96, 96));

    let frame = jpeg.frame().unwrap();
    assert_eq!(frame.P(), 8);
    assert_eq!((frame.width(), frame.height()), (48, 32));
    let ids = frame.components().iter().map(|c| c.id()).collect::<Vec<_>>();
    assert_eq!(ids, [ComponentId::Y, ComponentId::Cb, ComponentId::Cr]);
    assert_eq!((frame.components()[0].Hi(), frame.components()[0].Vi()), (2, 2));
    assert_eq!(frame.components()[2].Tqi(), 1);

    assert_eq!(jpeg.quantization_tables().len(), 2);
    assert_eq!(jpeg.quantization_table(1).unwrap().values().next(), Some(2));
    assert!(jpeg.quantization_table(2).is_none());

    assert_eq!(jpeg.huffman_tables().len(), 4);
    let ac1 = jpeg.huffman_table(TableClass::Ac, 1).unwrap();
    assert_eq!(ac1.Li(), &DC_COUNTS);
    assert_eq!(ac1.Vij(), &DC_VALUES);

    assert_eq!(jpeg.restart_interval(), Some(2));
    assert_eq!(jpeg.comments(), &[&b"synthetic"[..]]);

    let scan = jpeg.scan().unwrap();
    assert_eq!(scan.components().len(), 3);
    assert_eq!((scan.components()[1].Tdj(), scan.components()[1].Taj()), (1, 1));
    assert_eq!((scan.Ss(), scan.Se()), (Some(0), Some(63)));
    assert_eq!(scan.data().data().len(), 11);
    assert_eq!(scan.data().offset() + 11 + 2, data.len());
    let intervals = scan.data().intervals();
    assert_eq!(intervals.len(), 3);
    assert_eq!(intervals[0], &[0xA1, 0xFF, 0x00, 0xB2]);
    assert_eq!(intervals[2], &[0xE5]);

    assert_eq!(jpeg.segment_count(), 7);
    assert!(jpeg.trailing_bytes().is_empty());
}

#[test]
fn strict_baseline() {
    // Every segment in the baseline file has a decoder.
    let data = baseline();
    Jpeg::parse_with(&data, ParseOptions::strict()).unwrap();

    // With RST markers ending the scan, the walk fails on the restart marker.
    let err = Jpeg::parse_with(
        &data,
        ParseOptions::strict().restart_markers(RestartMarkers::Stop),
    )
    .err()
    .unwrap();
    assert_eq!(*err.kind(), ErrorKind::UnsupportedSegment(Marker::RST(0)));
}

#[test]
fn trailing_data() {
    let mut data = baseline();
    data.extend_from_slice(b"trailer");
    let jpeg = Jpeg::parse(&data).unwrap();
    assert_eq!(jpeg.trailing_bytes(), b"trailer");
}

#[test]
fn table_slots() {
    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt(&[0, 1]));
    data.extend(dqt(&[1, 2, 3]));
    data.extend([0xFF, 0xD9]);
    let jpeg = Jpeg::parse(&data).unwrap();
    let ids = jpeg.quantization_tables().iter().map(|t| t.Tq()).collect::<Vec<_>>();
    assert_eq!(ids, [0, 1, 2, 3]);
    // Redefinition replaced the first table 1.
    assert_eq!(jpeg.quantization_table(1).unwrap().values().next(), Some(2));

    let mut data = vec![0xFF, 0xD8];
    data.extend(dqt(&[0, 1, 2, 3]));
    let offset = data.len();
    data.extend(dqt(&[4]));
    data.extend([0xFF, 0xD9]);
    let err = Jpeg::parse(&data).err().unwrap();
    assert_eq!(*err.kind(), ErrorKind::TooManyTables);
    assert_eq!(err.offset(), Some(offset));
    assert_eq!(err.marker(), Some(Marker::DQT));

    let mut data = vec![0xFF, 0xD8];
    data.extend(dht(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 0)]));
    data.extend(dht(&[(1, 2)]));
    data.extend([0xFF, 0xD9]);
    let err = Jpeg::parse(&data).err().unwrap();
    assert_eq!(*err.kind(), ErrorKind::TooManyTables);
    assert_eq!(err.marker(), Some(Marker::DHT));
}

#[test]
fn duplicate_frame() {
    let sof = segment(0xC0, &[8, 0, 1, 0, 1, 1, 1, 0x11, 0]);
    let mut data = vec![0xFF, 0xD8];
    data.extend(&sof);
    data.extend(&sof);
    data.extend([0xFF, 0xD9]);
    let err = Jpeg::parse(&data).err().unwrap();
    assert_eq!(*err.kind(), ErrorKind::DuplicateFrame);
    assert_eq!(err.marker(), Some(Marker::SOF(0)));
}

#[test]
fn garbage_terminates() {
    let valid = baseline();
    let mut rng = fastrand::Rng::with_seed(0x5EED);

    for _ in 0..2000 {
        let data = match rng.u8(0..3) {
            // Random bytes, mostly with a valid signature.
            0 => {
                let mut data = vec![0xFF, 0xD8];
                data.extend((0..rng.usize(0..64)).map(|_| rng.u8(..)));
                data
            }
            // Random bytes biased towards markers.
            1 => {
                let mut data = vec![0xFF, 0xD8];
                data.extend((0..rng.usize(0..64)).map(|_| match rng.u8(0..4) {
                    0 => 0xFF,
                    1 => 0x00,
                    _ => rng.u8(0xC0..),
                }));
                data
            }
            // Mutated or truncated versions of a valid file.
            _ => {
                let mut data = valid.clone();
                for _ in 0..rng.usize(1..4) {
                    let i = rng.usize(..data.len());
                    data[i] = rng.u8(..);
                }
                data.truncate(rng.usize(..=data.len()));
                data
            }
        };

        // Must not panic, and must not loop.
        let _ = Jpeg::parse(&data);
        let _ = Jpeg::parse_with(&data, ParseOptions::strict());
    }
}
