//! A parser for the marker segment structure of JPEG/JFIF files.
//!
//! This crate does not decode any pixels. It walks the marker segments of a JPEG file, decodes
//! the headers and tables they contain, and locates the entropy-coded scan data.
//!
//! [`JpegParser`] yields one [`Segment`] at a time. [`Jpeg::parse`] runs it to completion and
//! collects the decoded segments.

mod error;
mod file;
mod marker;
mod reader;
mod scan;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorKind};
pub use file::{
    ComponentId, Com, DensityUnit, Dht, Dnl, Dqt, Dri, FrameComponent, HuffmanTable, Jfif,
    JpegParser, ParseOptions, QuantizationTable, ScanComponent, Segment, SegmentKind, Sof,
    SofMarker, Sos, TableClass, UnsupportedSegments, MAX_COMPONENTS,
};
pub use marker::Marker;
pub use scan::{RestartMarkers, ScanData};

use error::Result;

/// Number of quantization table slots, and of huffman table slots.
pub const MAX_TABLES: usize = 4;

/// The decoded segments of a complete JPEG file.
pub struct Jpeg<'a> {
    jfif: Option<Jfif<'a>>,
    frame: Option<Sof>,
    scan: Option<Sos<'a>>,
    quantization_tables: Vec<QuantizationTable<'a>>,
    huffman_tables: Vec<HuffmanTable<'a>>,
    restart_interval: Option<u16>,
    number_of_lines: Option<u16>,
    comments: Vec<&'a [u8]>,
    segment_count: usize,
    trailing_bytes: &'a [u8],
}

impl<'a> Jpeg<'a> {
    /// Parses an in-memory JPEG file with the default [`ParseOptions`].
    pub fn parse(jpeg: &'a [u8]) -> Result<Self> {
        Self::parse_with(jpeg, ParseOptions::default())
    }

    pub fn parse_with(jpeg: &'a [u8], options: ParseOptions) -> Result<Self> {
        let mut this = Self {
            jfif: None,
            frame: None,
            scan: None,
            quantization_tables: Vec::new(),
            huffman_tables: Vec::new(),
            restart_interval: None,
            number_of_lines: None,
            comments: Vec::new(),
            segment_count: 0,
            trailing_bytes: &[],
        };

        let mut parser = JpegParser::with_options(jpeg, options)?;
        while let Some(segment) = parser.next_segment()? {
            this.segment_count += 1;

            let (offset, marker) = (segment.offset(), segment.marker());
            let Some(kind) = segment.into_segment_kind() else {
                continue;
            };
            this.add(kind)
                .map_err(|e| e.at(offset).in_segment(marker))?;
        }
        this.trailing_bytes = parser.remaining();

        Ok(this)
    }

    fn add(&mut self, kind: SegmentKind<'a>) -> Result<()> {
        match kind {
            SegmentKind::Jfif(jfif) => {
                if self.jfif.is_some() {
                    log::warn!("ignoring duplicate JFIF header");
                } else {
                    self.jfif = Some(jfif);
                }
            }
            SegmentKind::Sof(sof) => {
                if self.frame.is_some() {
                    return Err(Error::from(ErrorKind::DuplicateFrame));
                }
                self.frame = Some(sof);
            }
            SegmentKind::Dqt(dqt) => {
                for table in dqt.into_tables() {
                    let tq = table.Tq();
                    define(&mut self.quantization_tables, table, |t| t.Tq() == tq)?;
                }
            }
            SegmentKind::Dht(dht) => {
                for table in dht.into_tables() {
                    let (class, th) = (table.class(), table.Th());
                    define(&mut self.huffman_tables, table, |t| {
                        t.class() == class && t.Th() == th
                    })?;
                }
            }
            SegmentKind::Sos(sos) => {
                if self.scan.is_some() {
                    log::debug!("replacing previous scan");
                }
                self.scan = Some(sos);
            }
            SegmentKind::Dri(dri) => self.restart_interval = Some(dri.Ri()),
            SegmentKind::Dnl(dnl) => self.number_of_lines = Some(dnl.NL()),
            SegmentKind::Com(com) => self.comments.push(com.text()),
        }
        Ok(())
    }

    #[inline]
    pub fn jfif(&self) -> Option<&Jfif<'a>> {
        self.jfif.as_ref()
    }

    #[inline]
    pub fn frame(&self) -> Option<&Sof> {
        self.frame.as_ref()
    }

    /// Returns the last scan in the file.
    #[inline]
    pub fn scan(&self) -> Option<&Sos<'a>> {
        self.scan.as_ref()
    }

    /// Returns the quantization tables, in order of their first definition.
    #[inline]
    pub fn quantization_tables(&self) -> &[QuantizationTable<'a>] {
        &self.quantization_tables
    }

    pub fn quantization_table(&self, tq: u8) -> Option<&QuantizationTable<'a>> {
        self.quantization_tables.iter().find(|t| t.Tq() == tq)
    }

    /// Returns the huffman tables, in order of their first definition.
    #[inline]
    pub fn huffman_tables(&self) -> &[HuffmanTable<'a>] {
        &self.huffman_tables
    }

    pub fn huffman_table(&self, class: TableClass, th: u8) -> Option<&HuffmanTable<'a>> {
        self.huffman_tables
            .iter()
            .find(|t| t.class() == class && t.Th() == th)
    }

    /// Returns the restart interval set by the last DRI segment.
    #[inline]
    pub fn restart_interval(&self) -> Option<u16> {
        self.restart_interval
    }

    #[inline]
    pub fn number_of_lines(&self) -> Option<u16> {
        self.number_of_lines
    }

    #[inline]
    pub fn comments(&self) -> &[&'a [u8]] {
        &self.comments
    }

    /// Returns the number of segments between SOI and EOI, including those without a decoder.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Returns any data following the EOI marker.
    #[inline]
    pub fn trailing_bytes(&self) -> &'a [u8] {
        self.trailing_bytes
    }
}

/// Stores `table` in the slot matched by `same_slot`, or in a new slot.
fn define<T>(tables: &mut Vec<T>, table: T, same_slot: impl Fn(&T) -> bool) -> Result<()> {
    if let Some(slot) = tables.iter_mut().find(|t| same_slot(t)) {
        log::debug!("table redefined");
        *slot = table;
        return Ok(());
    }

    if tables.len() == MAX_TABLES {
        return Err(Error::from(ErrorKind::TooManyTables));
    }
    tables.push(table);
    Ok(())
}
