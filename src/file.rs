//! Marker segment walker and segment decoders.

#![allow(non_snake_case)]


use std::fmt;

use bytemuck::AnyBitPattern;

use crate::{
    error::{Error, ErrorKind, Result},
    marker::Marker,
    reader::Reader,
    scan::{self, RestartMarkers, ScanData},
};

/// Maximum number of components in a frame or scan.
pub const MAX_COMPONENTS: usize = 5;

/// What to do with segments this parser has no decoder for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedSegments {
    /// Return them from [`JpegParser::next_segment`] with only their raw bytes.
    #[default]
    Retain,
    /// Fail with [`ErrorKind::UnsupportedSegment`].
    Reject,
}

/// Policies controlling how strictly a [`JpegParser`] treats its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    unsupported_segments: UnsupportedSegments,
    restart_markers: RestartMarkers,
}

impl ParseOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reject every segment without a decoder.
    #[inline]
    pub fn strict() -> Self {
        Self::default().unsupported_segments(UnsupportedSegments::Reject)
    }

    #[inline]
    pub fn unsupported_segments(mut self, policy: UnsupportedSegments) -> Self {
        self.unsupported_segments = policy;
        self
    }

    #[inline]
    pub fn restart_markers(mut self, policy: RestartMarkers) -> Self {
        self.restart_markers = policy;
        self
    }
}

pub struct JpegParser<'a> {
    reader: Reader<'a>,
    options: ParseOptions,
    done: bool,
}

impl<'a> JpegParser<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        Self::with_options(buf, ParseOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: ParseOptions) -> Result<Self> {
        const SOI: &[u8] = &[0xFF, 0xD8];

        let mut reader = Reader::new(buf);
        if reader.read_slice(SOI.len()).ok() != Some(SOI) {
            return Err(Error::from(ErrorKind::NotAJpeg).at(0));
        }
        Ok(Self {
            reader,
            options,
            done: false,
        })
    }

    /// Advances past the next marker and returns the segment it introduces.
    ///
    /// The leading `SOI` is consumed by the constructor. Standalone markers other than `EOI` are
    /// returned as segments with no payload unless [`UnsupportedSegments::Reject`] is set.
    ///
    /// `EOI` ends the walk: it and every later call return `Ok(None)`. Bytes after it are
    /// available via [`JpegParser::remaining`].
    pub fn next_segment(&mut self) -> Result<Option<Segment<'a>>> {
        if self.done {
            return Ok(None);
        }

        // Any number of 0xFF fill bytes may precede a marker.
        let mut prefixed = false;
        let byte = loop {
            match self.reader.read_u8()? {
                0xFF => prefixed = true,
                byte => break byte,
            }
        };

        let marker_offset = self.reader.position() - 1;
        let marker = Marker::from_u8(byte).map_err(|e| e.at(marker_offset))?;
        let segment_offset = if prefixed {
            marker_offset - 1
        } else {
            log::warn!("{marker} marker at {marker_offset:#x} is not preceded by 0xFF");
            marker_offset
        };

        if marker == Marker::EOI {
            if !self.reader.remaining().is_empty() {
                log::warn!(
                    "{} bytes of trailing data after EOI",
                    self.reader.remaining().len()
                );
            }

            self.done = true;
            return Ok(None);
        }

        if !marker.has_length() {
            // RSTn is only valid inside of scan data, TEM only in arithmetic coding, and SOI only
            // at the very start.
            self.unsupported(marker, segment_offset)?;
            log::warn!("skipping standalone {marker} marker at {segment_offset:#x}");
            return Ok(Some(Segment {
                marker,
                raw_bytes: &[],
                offset: segment_offset,
                kind: None,
            }));
        }

        let length = usize::from(
            self.reader
                .read_length()
                .map_err(|e| e.in_segment(marker))?,
        );
        let mut reader = self
            .reader
            .sub_reader(length)
            .map_err(|e| e.in_segment(marker))?;
        self.reader.skip(length)?;

        let raw_bytes = reader.remaining();
        let kind = self
            .read_segment(marker, segment_offset, &mut reader)
            .map_err(|e| e.in_segment(marker))?;

        // The segment specified a bigger length than what we ended up reading. The remaining bytes
        // are skipped.
        match &kind {
            Some(SegmentKind::Jfif(_)) | None => {}
            Some(_) if !reader.is_empty() => {
                log::warn!(
                    "{} segment specified a length of {} bytes, but {} remain after decoding",
                    marker,
                    length,
                    reader.remaining().len(),
                );
            }
            Some(_) => {}
        }

        log::trace!("{marker} segment at {segment_offset:#x}, {length} bytes");

        Ok(Some(Segment {
            marker,
            raw_bytes,
            offset: segment_offset,
            kind,
        }))
    }

    /// Returns the input that has not been walked yet.
    ///
    /// Between calls to [`JpegParser::next_segment`] this starts at the marker of the next
    /// segment, or after `EOI` once the walk has finished.
    pub fn remaining(&self) -> &'a [u8] {
        self.reader.remaining()
    }

    /// Returns the current offset of the parser in the input data.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    fn unsupported(&self, marker: Marker, offset: usize) -> Result<()> {
        match self.options.unsupported_segments {
            UnsupportedSegments::Retain => Ok(()),
            UnsupportedSegments::Reject => Err(Error::from(ErrorKind::UnsupportedSegment(marker))
                .at(offset)
                .in_segment(marker)),
        }
    }

    fn read_segment(
        &mut self,
        marker: Marker,
        offset: usize,
        reader: &mut Reader<'a>,
    ) -> Result<Option<SegmentKind<'a>>> {
        let kind = match marker {
            Marker::DQT => SegmentKind::Dqt(self.read_dqt(reader)?),
            Marker::DHT => SegmentKind::Dht(self.read_dht(reader)?),
            Marker::SOF(n) => SegmentKind::Sof(self.read_sof(n, reader)?),
            Marker::SOS => SegmentKind::Sos(self.read_sos(reader)?),
            Marker::DRI => SegmentKind::Dri(Dri {
                Ri: reader.read_u16()?,
            }),
            Marker::DNL => SegmentKind::Dnl(Dnl {
                NL: reader.read_u16()?,
            }),
            Marker::APP(0) => SegmentKind::Jfif(self.read_jfif(reader)?),
            Marker::COM => SegmentKind::Com(Com {
                com: reader.read_slice(reader.remaining().len())?,
            }),
            _ => {
                self.unsupported(marker, offset)?;
                return Ok(None);
            }
        };
        Ok(Some(kind))
    }

    fn read_dqt(&mut self, reader: &mut Reader<'a>) -> Result<Dqt<'a>> {
        // A DQT segment may define any number of tables, but always at least one.
        let mut tables = Vec::new();
        loop {
            let PqTq = reader.read_u8()?;
            let len = if PqTq >> 4 == 0 { 64 } else { 128 };
            tables.push(QuantizationTable {
                PqTq,
                Qk: reader.read_slice(len)?,
            });

            if reader.is_empty() {
                break;
            }
        }

        Ok(Dqt(tables))
    }

    fn read_dht(&mut self, reader: &mut Reader<'a>) -> Result<Dht<'a>> {
        let mut tables = Vec::new();
        loop {
            let header: &DhtHeader = reader.read_obj()?;
            let values = reader.read_slice(header.num_values())?;
            tables.push(HuffmanTable {
                header,
                Vij: values,
            });

            if reader.is_empty() {
                break;
            }
        }

        Ok(Dht { tables })
    }

    fn read_sof(&mut self, n: u8, reader: &mut Reader<'a>) -> Result<Sof> {
        let P = reader.read_u8()?;
        let X = reader.read_u16()?;
        let Y = reader.read_u16()?;
        let num_components = read_component_count(reader)?;
        let start = reader.position();
        let specs = reader.read_objs::<FrameComponentSpec>(num_components)?;

        let mut components = Vec::with_capacity(num_components);
        for (i, spec) in specs.iter().enumerate() {
            let offset = start + i * 3;
            components.push(FrameComponent {
                id: ComponentId::from_wire(spec.Ci).map_err(|e| e.at(offset))?,
                HiVi: spec.HiVi,
                Tqi: spec.Tqi,
            });
        }

        Ok(Sof {
            sof: SofMarker(Marker::SOF(n).code()),
            P,
            X,
            Y,
            components,
        })
    }

    fn read_sos(&mut self, reader: &mut Reader<'a>) -> Result<Sos<'a>> {
        let num_components = read_component_count(reader)?;
        let start = reader.position();
        let specs = reader.read_objs::<ScanComponentSpec>(num_components)?;

        let mut components = Vec::with_capacity(num_components);
        for (i, spec) in specs.iter().enumerate() {
            let offset = start + i * 2;
            components.push(ScanComponent {
                id: ComponentId::from_wire(spec.Csj).map_err(|e| e.at(offset))?,
                TdjTaj: spec.TdjTaj,
            });
        }

        // Ss, Se and AhAl are optional. Anything shorter is left to the leftover-bytes warning.
        let selection = if reader.remaining().len() >= 3 {
            Some(reader.read_array::<3>()?)
        } else {
            None
        };

        // The scan data follows the segment and is not included in its length, so it is read from
        // the main reader instead.
        let data = scan::read_scan_data(&mut self.reader, self.options.restart_markers)?;

        Ok(Sos {
            components,
            selection,
            data,
        })
    }

    fn read_jfif(&mut self, reader: &mut Reader<'a>) -> Result<Jfif<'a>> {
        const JFIF: &[u8] = b"JFIF\0";

        let offset = reader.position();
        if reader.read_slice(JFIF.len())? != JFIF {
            return Err(Error::from(ErrorKind::InvalidIdentifier).at(offset));
        }

        let major_version = reader.read_u8()?;
        let minor_version = reader.read_u8()?;
        let offset = reader.position();
        let unit = match reader.read_u8()? {
            0 => DensityUnit::PixelAspectRatio,
            1 => DensityUnit::PixelsPerInch,
            2 => DensityUnit::PixelsPerCm,
            e => return Err(Error::from(ErrorKind::InvalidDensityUnit(e)).at(offset)),
        };
        let offset = reader.position();
        let xdensity = reader.read_u16()?;
        let ydensity = reader.read_u16()?;
        if xdensity == 0 || ydensity == 0 {
            return Err(Error::from(ErrorKind::ZeroDensity).at(offset));
        }
        let xthumbnail = reader.read_u8()?;
        let ythumbnail = reader.read_u8()?;
        Ok(Jfif {
            major_version,
            minor_version,
            unit,
            xdensity,
            ydensity,
            xthumbnail,
            ythumbnail,
            thumbnail: reader.read_slice(usize::from(xthumbnail) * usize::from(ythumbnail) * 3)?,
        })
    }
}

fn read_component_count(reader: &mut Reader<'_>) -> Result<usize> {
    let offset = reader.position();
    let count = reader.read_u8()?;
    if usize::from(count) > MAX_COMPONENTS {
        return Err(Error::from(ErrorKind::TooManyComponents(count)).at(offset));
    }
    Ok(count.into())
}

/// One marker segment, borrowed from the input buffer.
#[derive(Debug)]
pub struct Segment<'a> {
    marker: Marker,
    raw_bytes: &'a [u8],
    offset: usize,
    kind: Option<SegmentKind<'a>>,
}

impl<'a> Segment<'a> {
    /// Byte offset of the `0xFF` that starts this segment's marker, or of the marker byte itself
    /// if no `0xFF` precedes it.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the marker indicating the type of the segment.
    #[inline]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// The segment payload, as bounded by its length field.
    ///
    /// Neither the marker nor the length field is included. For SOS this is the scan header only;
    /// the entropy-coded data is in [`Sos::data`]. Standalone markers have an empty payload.
    #[inline]
    pub fn raw_bytes(&self) -> &'a [u8] {
        self.raw_bytes
    }

    /// Returns the decoded contents of the segment, or `None` if this parser does not understand
    /// this kind of segment.
    #[inline]
    pub fn as_segment_kind(&self) -> Option<&SegmentKind<'a>> {
        self.kind.as_ref()
    }

    #[inline]
    pub fn into_segment_kind(self) -> Option<SegmentKind<'a>> {
        self.kind
    }
}

/// Decoded contents of a segment.
#[derive(Debug)]
#[non_exhaustive]
pub enum SegmentKind<'a> {
    Jfif(Jfif<'a>),
    Dqt(Dqt<'a>),
    Dht(Dht<'a>),
    Sof(Sof),
    Sos(Sos<'a>),
    Dri(Dri),
    Dnl(Dnl),
    Com(Com<'a>),
}

/// The JFIF header, stored in an `APP0` segment.
#[derive(Debug)]
pub struct Jfif<'a> {
    major_version: u8,
    minor_version: u8,
    unit: DensityUnit,
    xdensity: u16,
    ydensity: u16,
    xthumbnail: u8,
    ythumbnail: u8,
    thumbnail: &'a [u8],
}

impl<'a> Jfif<'a> {
    #[inline]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    #[inline]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    #[inline]
    pub fn unit(&self) -> DensityUnit {
        self.unit
    }

    /// Returns the horizontal pixel density. Never 0.
    #[inline]
    pub fn density_x(&self) -> u16 {
        self.xdensity
    }

    /// Returns the vertical pixel density. Never 0.
    #[inline]
    pub fn density_y(&self) -> u16 {
        self.ydensity
    }

    #[inline]
    pub fn thumbnail_width(&self) -> u8 {
        self.xthumbnail
    }

    #[inline]
    pub fn thumbnail_height(&self) -> u8 {
        self.ythumbnail
    }

    /// Returns the uncompressed thumbnail, as packed 24-bit RGB pixels.
    #[inline]
    pub fn thumbnail_data(&self) -> &'a [u8] {
        self.thumbnail
    }
}

/// Unit of the [`Jfif`] pixel densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    /// No unit, the densities only specify the pixel aspect ratio.
    PixelAspectRatio,
    PixelsPerInch,
    PixelsPerCm,
}

impl fmt::Display for DensityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PixelAspectRatio => "pixel aspect ratio",
            Self::PixelsPerInch => "pixels per inch",
            Self::PixelsPerCm => "pixels per cm",
        })
    }
}

/// Identifies an image component.
///
/// On the wire, components are numbered starting at 1, in the order listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Y,
    Cb,
    Cr,
    I,
    Q,
}

impl ComponentId {
    const ALL: [Self; MAX_COMPONENTS] = [Self::Y, Self::Cb, Self::Cr, Self::I, Self::Q];

    /// Maps a component identifier as stored in a frame or scan header.
    ///
    /// Fails with [`ErrorKind::InvalidComponentId`] unless `id` is in range 1-5.
    pub fn from_wire(id: u8) -> Result<Self> {
        usize::from(id)
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| Error::from(ErrorKind::InvalidComponentId(id)))
    }

    /// Returns the identifier as stored in a frame or scan header.
    pub fn to_wire(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct Com<'a> {
    com: &'a [u8],
}

impl<'a> Com<'a> {
    /// Returns the comment bytes. These are commonly, but not necessarily, ASCII text.
    #[inline]
    pub fn text(&self) -> &'a [u8] {
        self.com
    }
}

impl<'a> fmt::Debug for Com<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Com(\"{}\")", self.com.escape_ascii())
    }
}

pub struct QuantizationTable<'a> {
    PqTq: u8,
    Qk: &'a [u8],
}

impl<'a> QuantizationTable<'a> {
    /// Element precision.
    ///
    /// - 0: 8-bit `Qk` values
    /// - anything else: 16-bit `Qk` values
    #[inline]
    pub fn Pq(&self) -> u8 {
        self.PqTq >> 4
    }

    /// Returns the destination identifier (0-3 in valid files).
    #[inline]
    pub fn Tq(&self) -> u8 {
        self.PqTq & 0xf
    }

    /// Whether the table elements are 16 bits wide.
    #[inline]
    pub fn is_16_bit(&self) -> bool {
        self.Pq() != 0
    }

    /// Returns the raw table elements in zigzag order: 64 bytes for 8-bit tables, 128 bytes for
    /// 16-bit tables.
    #[inline]
    pub fn Qk(&self) -> &'a [u8] {
        self.Qk
    }

    /// Returns the 64 table elements in zigzag order.
    pub fn values(&self) -> impl Iterator<Item = u16> + 'a {
        let Qk = self.Qk;
        let wide = self.is_16_bit();
        (0..64).map(move |k| {
            if wide {
                u16::from_be_bytes([Qk[k * 2], Qk[k * 2 + 1]])
            } else {
                u16::from(Qk[k])
            }
        })
    }
}

impl<'a> fmt::Debug for QuantizationTable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantizationTable")
            .field("Pq", &self.Pq())
            .field("Tq", &self.Tq())
            .field("Qk", &self.values().collect::<Vec<_>>())
            .finish()
    }
}

/// **DQT** Define Quantization Tables. Holds at least one table.
#[derive(Debug)]
pub struct Dqt<'a>(Vec<QuantizationTable<'a>>);

impl<'a> Dqt<'a> {
    #[inline]
    pub fn tables(&self) -> impl Iterator<Item = &QuantizationTable<'a>> {
        self.0.iter()
    }

    #[inline]
    pub fn into_tables(self) -> Vec<QuantizationTable<'a>> {
        self.0
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct DhtHeader {
    TcTh: u8,
    Li: [u8; 16],
}

impl DhtHeader {
    fn num_values(&self) -> usize {
        self.Li.iter().map(|l| *l as usize).sum()
    }
}

/// Huffman table class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableClass {
    Dc,
    Ac,
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dc => "DC",
            Self::Ac => "AC",
        })
    }
}

pub struct HuffmanTable<'a> {
    header: &'a DhtHeader,
    Vij: &'a [u8],
}

impl<'a> HuffmanTable<'a> {
    /// Returns the raw table class (0 = DC, 1 = AC).
    #[inline]
    pub fn Tc(&self) -> u8 {
        self.header.TcTh >> 4
    }

    /// Returns the table class. Any non-zero `Tc` is treated as AC.
    #[inline]
    pub fn class(&self) -> TableClass {
        match self.Tc() {
            0 => TableClass::Dc,
            _ => TableClass::Ac,
        }
    }

    /// Returns the table destination identifier (0-3).
    #[inline]
    pub fn Th(&self) -> u8 {
        self.header.TcTh & 0xf
    }

    /// Number of codes of each length from 1 to 16 bits.
    #[inline]
    pub fn Li(&self) -> &'a [u8; 16] {
        &self.header.Li
    }

    /// Returns the values associated with each huffman code, ordered by code length.
    #[inline]
    pub fn Vij(&self) -> &'a [u8] {
        self.Vij
    }
}

impl<'a> fmt::Debug for HuffmanTable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuffmanTable")
            .field("Tc", &self.Tc())
            .field("Th", &self.Th())
            .field("Li", &self.Li())
            .field("Vij", &self.Vij)
            .finish()
    }
}

/// **DHT** Define Huffman Tables. Holds at least one table.
#[derive(Debug)]
pub struct Dht<'a> {
    tables: Vec<HuffmanTable<'a>>,
}

impl<'a> Dht<'a> {
    pub fn tables(&self) -> impl Iterator<Item = &HuffmanTable<'a>> {
        self.tables.iter()
    }

    pub fn into_tables(self) -> Vec<HuffmanTable<'a>> {
        self.tables
    }
}

/// **DRI** Define Restart Interval. An interval of 0 disables restart markers.
#[derive(Clone, Copy)]
pub struct Dri {
    Ri: u16,
}

impl Dri {
    /// MCUs per restart interval.
    #[inline]
    pub fn Ri(&self) -> u16 {
        self.Ri
    }
}

impl fmt::Debug for Dri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dri").field("Ri", &self.Ri).finish()
    }
}

/// **D**efine **N**umber of **L**ines, which completes a frame header that specified a height of 0.
#[derive(Clone, Copy)]
pub struct Dnl {
    NL: u16,
}

impl Dnl {
    #[inline]
    pub fn NL(&self) -> u16 {
        self.NL
    }
}

impl fmt::Debug for Dnl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dnl").field("NL", &self.NL).finish()
    }
}

/// **SOF** Start Of Frame header. All 13 SOF variants share this layout.
#[derive(Debug)]
pub struct Sof {
    sof: SofMarker,
    P: u8,
    X: u16,
    Y: u16,
    components: Vec<FrameComponent>,
}

impl Sof {
    #[inline]
    pub fn sof(&self) -> SofMarker {
        self.sof
    }

    /// Sample precision in bits (8 for baseline).
    #[inline]
    pub fn P(&self) -> u8 {
        self.P
    }

    /// Number of lines. 0 if a later DNL segment defines it.
    #[inline]
    pub fn Y(&self) -> u16 {
        self.Y
    }

    /// Number of samples per line.
    #[inline]
    pub fn X(&self) -> u16 {
        self.X
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.X
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.Y
    }

    /// Returns the frame components, at most [`MAX_COMPONENTS`].
    #[inline]
    pub fn components(&self) -> &[FrameComponent] {
        &self.components
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SofMarker(u8);

impl fmt::Debug for SofMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOF{}", self.0 - 0xC0)
    }
}

impl SofMarker {
    /// Baseline DCT.
    pub const SOF0: Self = Self(0xC0);
    /// Extended Sequential DCT.
    pub const SOF1: Self = Self(0xC1);
    /// Progressive DCT.
    pub const SOF2: Self = Self(0xC2);
    /// Lossless sequential.
    pub const SOF3: Self = Self(0xC3);
    /// Differential sequential DCT.
    pub const SOF5: Self = Self(0xC5);
    /// Differential progressive DCT.
    pub const SOF6: Self = Self(0xC6);
    /// Differential lossless (sequential).
    pub const SOF7: Self = Self(0xC7);
    /// Extended sequential DCT, arithmetic coding.
    pub const SOF9: Self = Self(0xC9);
    /// Progressive DCT, arithmetic coding.
    pub const SOF10: Self = Self(0xCA);
    /// Lossless (sequential), arithmetic coding.
    pub const SOF11: Self = Self(0xCB);
    /// Differential sequential DCT, arithmetic coding.
    pub const SOF13: Self = Self(0xCD);
    /// Differential progressive DCT, arithmetic coding.
    pub const SOF14: Self = Self(0xCE);
    /// Differential lossless (sequential), arithmetic coding.
    pub const SOF15: Self = Self(0xCF);

    /// Whether the frame's scans use arithmetic coding instead of huffman coding.
    #[inline]
    pub fn is_arithmetic(self) -> bool {
        self.0 >= 0xC8
    }

    #[inline]
    pub fn marker(self) -> Marker {
        Marker::SOF(self.0 - 0xC0)
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct FrameComponentSpec {
    Ci: u8,
    HiVi: u8,
    Tqi: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    id: ComponentId,
    HiVi: u8,
    Tqi: u8,
}

impl FrameComponent {
    /// Returns this component's identifier.
    ///
    /// The scan header ([`Sos`]) refers to components using their identifier.
    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Horizontal sampling factor, in data units per MCU.
    #[inline]
    pub fn Hi(&self) -> u8 {
        self.HiVi >> 4
    }

    /// Vertical sampling factor, in data units per MCU.
    #[inline]
    pub fn Vi(&self) -> u8 {
        self.HiVi & 0xf
    }

    /// Quantization table destination used by this component (0-3 in valid files).
    #[inline]
    pub fn Tqi(&self) -> u8 {
        self.Tqi
    }
}

impl fmt::Debug for FrameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameComponent")
            .field("id", &self.id)
            .field("Hi", &self.Hi())
            .field("Vi", &self.Vi())
            .field("Tqi", &self.Tqi)
            .finish()
    }
}

/// **SOS** Start Of Scan, along with the entropy-coded data that follows the header.
pub struct Sos<'a> {
    components: Vec<ScanComponent>,
    /// `[Ss, Se, AhAl]`, if the header includes them.
    selection: Option<[u8; 3]>,
    data: ScanData<'a>,
}

impl<'a> Sos<'a> {
    /// Returns the scan components, at most [`MAX_COMPONENTS`].
    #[inline]
    pub fn components(&self) -> &[ScanComponent] {
        &self.components
    }

    /// Returns the start of spectral selection.
    ///
    /// This and the other selection parameters are `None` for headers that end after the
    /// component list.
    #[inline]
    pub fn Ss(&self) -> Option<u8> {
        self.selection.map(|[Ss, _, _]| Ss)
    }

    /// Returns the end of spectral selection.
    #[inline]
    pub fn Se(&self) -> Option<u8> {
        self.selection.map(|[_, Se, _]| Se)
    }

    /// Returns the successive approximation bit position high.
    #[inline]
    pub fn Ah(&self) -> Option<u8> {
        self.selection.map(|[_, _, AhAl]| AhAl >> 4)
    }

    /// Returns the successive approximation bit position low.
    #[inline]
    pub fn Al(&self) -> Option<u8> {
        self.selection.map(|[_, _, AhAl]| AhAl & 0xf)
    }

    /// Returns the entropy-coded data following the scan header.
    #[inline]
    pub fn data(&self) -> &ScanData<'a> {
        &self.data
    }
}

impl<'a> fmt::Debug for Sos<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Sos");
        s.field("components", &self.components);
        if let Some([Ss, Se, AhAl]) = self.selection {
            s.field("Ss", &Ss)
                .field("Se", &Se)
                .field("Ah", &(AhAl >> 4))
                .field("Al", &(AhAl & 0xf));
        }
        s.field("data", &self.data).finish()
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct ScanComponentSpec {
    Csj: u8,
    TdjTaj: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    id: ComponentId,
    TdjTaj: u8,
}

impl ScanComponent {
    /// Returns the component this scan component refers to.
    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns the DC entropy coding table destination selector.
    #[inline]
    pub fn Tdj(&self) -> u8 {
        self.TdjTaj >> 4
    }

    /// Returns the AC entropy coding table destination selector.
    #[inline]
    pub fn Taj(&self) -> u8 {
        self.TdjTaj & 0xf
    }
}

impl fmt::Debug for ScanComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanComponent")
            .field("id", &self.id)
            .field("Tdj", &self.Tdj())
            .field("Taj", &self.Taj())
            .finish()
    }
}
