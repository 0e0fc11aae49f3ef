//! JPEG marker codes (ITU T.81, Table B.1).

use core::fmt;

use crate::error::{Error, ErrorKind, Result};

/// The kind of a marker segment, identified by the `xx` byte of its `FF xx` marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Start Of Frame, `SOFn`. Holds `n`, which is never 4, 8 or 12.
    SOF(u8),
    /// Define Huffman Table(s).
    DHT,
    /// Define Arithmetic Coding conditioning(s).
    DAC,
    /// Restart with modulo 8 count `n`.
    RST(u8),
    /// Start Of Image.
    SOI,
    /// End Of Image.
    EOI,
    /// Start Of Scan.
    SOS,
    /// Define Quantization Table(s).
    DQT,
    /// Define Number of Lines.
    DNL,
    /// Define Restart Interval.
    DRI,
    /// Define Hierarchical Progression.
    DHP,
    /// Expand Reference Component(s).
    EXP,
    /// Application segment `APPn`, `n` in `0..=15`.
    APP(u8),
    /// Reserved for JPEG extensions (`FF C8`).
    JPG,
    /// Reserved for JPEG extensions, `JPGn` with `n` in `0..=13`.
    JPGn(u8),
    /// Comment.
    COM,
    /// For temporary private use in arithmetic coding.
    TEM,
}

impl Marker {
    /// Classifies the `xx` byte of an `FF xx` marker.
    ///
    /// Fails with [`ErrorKind::UnknownMarker`] for the reserved codes `0x02..=0xBF`, the stuffing
    /// byte `0x00` and the fill byte `0xFF`.
    pub fn from_u8(byte: u8) -> Result<Self> {
        Ok(match byte {
            0x01 => Self::TEM,
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => Self::SOF(byte - 0xC0),
            0xC4 => Self::DHT,
            0xC8 => Self::JPG,
            0xCC => Self::DAC,
            0xD0..=0xD7 => Self::RST(byte - 0xD0),
            0xD8 => Self::SOI,
            0xD9 => Self::EOI,
            0xDA => Self::SOS,
            0xDB => Self::DQT,
            0xDC => Self::DNL,
            0xDD => Self::DRI,
            0xDE => Self::DHP,
            0xDF => Self::EXP,
            0xE0..=0xEF => Self::APP(byte - 0xE0),
            0xF0..=0xFD => Self::JPGn(byte - 0xF0),
            0xFE => Self::COM,
            _ => return Err(Error::from(ErrorKind::UnknownMarker(byte))),
        })
    }

    /// Returns the `xx` byte of this marker's `FF xx` code.
    pub fn code(self) -> u8 {
        match self {
            Self::TEM => 0x01,
            Self::SOF(n) => 0xC0 + n,
            Self::DHT => 0xC4,
            Self::JPG => 0xC8,
            Self::DAC => 0xCC,
            Self::RST(n) => 0xD0 + n,
            Self::SOI => 0xD8,
            Self::EOI => 0xD9,
            Self::SOS => 0xDA,
            Self::DQT => 0xDB,
            Self::DNL => 0xDC,
            Self::DRI => 0xDD,
            Self::DHP => 0xDE,
            Self::EXP => 0xDF,
            Self::APP(n) => 0xE0 + n,
            Self::JPGn(n) => 0xF0 + n,
            Self::COM => 0xFE,
        }
    }

    /// Whether the marker is followed by a length field and segment parameters.
    ///
    /// `SOI`, `EOI`, `TEM` and `RSTn` stand alone.
    pub fn has_length(self) -> bool {
        !matches!(self, Self::SOI | Self::EOI | Self::TEM | Self::RST(_))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SOF(n) => write!(f, "SOF{n}"),
            Self::RST(n) => write!(f, "RST{n}"),
            Self::APP(n) => write!(f, "APP{n}"),
            Self::JPGn(n) => write!(f, "JPG{n}"),
            Self::DHT => f.write_str("DHT"),
            Self::DAC => f.write_str("DAC"),
            Self::SOI => f.write_str("SOI"),
            Self::EOI => f.write_str("EOI"),
            Self::SOS => f.write_str("SOS"),
            Self::DQT => f.write_str("DQT"),
            Self::DNL => f.write_str("DNL"),
            Self::DRI => f.write_str("DRI"),
            Self::DHP => f.write_str("DHP"),
            Self::EXP => f.write_str("EXP"),
            Self::JPG => f.write_str("JPG"),
            Self::COM => f.write_str("COM"),
            Self::TEM => f.write_str("TEM"),
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_codes() {
        let mut recognized = 0;
        for byte in 0..=0xFF {
            match Marker::from_u8(byte) {
                Ok(marker) => {
                    assert_eq!(marker.code(), byte, "{marker}");
                    recognized += 1;
                }
                Err(e) => assert_eq!(*e.kind(), ErrorKind::UnknownMarker(byte)),
            }
        }

        // TEM, 13 SOFn, DHT, JPG, DAC, 8 RSTn, SOI..EXP, 16 APPn, 14 JPGn, COM
        assert_eq!(recognized, 1 + 13 + 3 + 8 + 8 + 16 + 14 + 1);
    }

    #[test]
    fn unknown() {
        for byte in [0x00, 0x02, 0x7F, 0xBF, 0xFF] {
            let err = Marker::from_u8(byte).unwrap_err();
            assert_eq!(*err.kind(), ErrorKind::UnknownMarker(byte));
        }
    }

    #[test]
    fn names() {
        let names = [0xC0, 0xCF, 0xC4, 0xD3, 0xE0, 0xEF, 0xF0, 0xFD, 0xDA, 0x01]
            .map(|b| Marker::from_u8(b).unwrap().to_string());
        assert_eq!(
            names,
            ["SOF0", "SOF15", "DHT", "RST3", "APP0", "APP15", "JPG0", "JPG13", "SOS", "TEM"]
        );
    }

    #[test]
    fn standalone() {
        assert!(!Marker::SOI.has_length());
        assert!(!Marker::RST(7).has_length());
        assert!(!Marker::TEM.has_length());
        assert!(Marker::SOS.has_length());
        assert!(Marker::APP(1).has_length());
    }
}
