use core::fmt;

use crate::marker::Marker;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// An error encountered while walking a JPEG stream.
///
/// The first error ends the walk. Use [`Error::kind`] to find out what went wrong, and
/// [`Error::offset`] and [`Error::marker`] to find out where.
pub struct Error {
    kind: ErrorKind,
    offset: Option<usize>,
    marker: Option<Marker>,
}

/// The kind of structural violation that ended the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A read requested more bytes than remain.
    Truncated,
    /// The data does not start with the `FF D8` SOI marker.
    NotAJpeg,
    /// A marker byte that is not assigned by the JPEG standard.
    UnknownMarker(u8),
    /// A recognized marker this parser has no decoder for.
    UnsupportedSegment(Marker),
    /// An APP0 segment whose identifier is not `JFIF\0`.
    InvalidIdentifier,
    /// The JFIF density unit is not 0, 1 or 2.
    InvalidDensityUnit(u8),
    /// The JFIF header specifies a horizontal or vertical density of 0.
    ZeroDensity,
    /// A segment length field below 2 (the length counts itself).
    InvalidLength(u16),
    /// A component identifier outside of 1-5.
    InvalidComponentId(u8),
    /// A frame or scan header with more than 5 components.
    TooManyComponents(u8),
    /// More distinct quantization or huffman tables than there are slots for.
    TooManyTables,
    /// A second frame header.
    DuplicateFrame,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("reached end of data while decoding JPEG stream"),
            Self::NotAJpeg => f.write_str("JPEG image does not start with SOI marker"),
            Self::UnknownMarker(byte) => write!(f, "unknown marker byte {byte:#04x}"),
            Self::UnsupportedSegment(marker) => write!(f, "{marker} segments are not supported"),
            Self::InvalidIdentifier => f.write_str("APP0 segment does not have a JFIF identifier"),
            Self::InvalidDensityUnit(unit) => {
                write!(f, "JFIF header specifies invalid density unit {unit}")
            }
            Self::ZeroDensity => f.write_str("JFIF header specifies a density of zero"),
            Self::InvalidLength(len) => write!(f, "invalid segment length {len}"),
            Self::InvalidComponentId(id) => {
                write!(f, "invalid component identifier {id} (only 1-5 are valid)")
            }
            Self::TooManyComponents(n) => {
                write!(f, "{n} components specified (at most 5 are allowed)")
            }
            Self::TooManyTables => f.write_str("too many distinct tables defined"),
            Self::DuplicateFrame => f.write_str("encountered multiple SOF markers"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            offset: None,
            marker: None,
        }
    }
}

impl Error {
    pub(crate) fn at(mut self, offset: usize) -> Self {
        self.offset.get_or_insert(offset);
        self
    }

    /// Attaches the segment the error occurred in, unless a more specific one is already set.
    pub(crate) fn in_segment(mut self, marker: Marker) -> Self {
        self.marker.get_or_insert(marker);
        self
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the byte offset in the input at which the error was detected, if known.
    #[inline]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns the marker of the segment that was being decoded, if any.
    #[inline]
    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", self.kind())
            .field("offset", &self.offset)
            .field("marker", &self.marker)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.kind(), f)?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {offset:#06x}")?;
        }
        if let Some(marker) = self.marker {
            write!(f, " in {marker} segment")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_context() {
        let err = Error::from(ErrorKind::ZeroDensity);
        assert_eq!(*err.kind(), ErrorKind::ZeroDensity);
        assert_eq!(err.to_string(), "JFIF header specifies a density of zero");

        let err = Error::from(ErrorKind::UnknownMarker(0x02)).at(3);
        assert_eq!(err.to_string(), "unknown marker byte 0x02 at offset 0x0003");

        let err = err.at(0x14).in_segment(Marker::APP(0));
        assert_eq!(
            err.to_string(),
            "JFIF header specifies a density of zero at offset 0x0014 in APP0 segment"
        );

        // The innermost context wins.
        let err = err.at(0x30).in_segment(Marker::SOS);
        assert_eq!(err.offset(), Some(0x14));
        assert_eq!(err.marker(), Some(Marker::APP(0)));
    }
}
