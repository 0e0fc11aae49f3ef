//! Entropy-coded scan data.
//!
//! The compressed data of a scan directly follows the `SOS` segment and is not length-prefixed.
//! Its end can only be found by searching for the next marker:
//!
//! - `0xFF 0x00` is a byte stuffing sequence, encoding a literal `0xFF` data byte.
//! - `0xFF 0xD0..=0xD7` are `RST` markers. Depending on [`RestartMarkers`], they either separate
//!   two restart intervals of the same scan or end the scan.
//! - Any other `0xFF 0xXX` starts the next marker segment (or is a fill byte preceding it).

use std::fmt;

use crate::{
    error::{Error, ErrorKind, Result},
    reader::Reader,
};

/// How `RST` markers inside entropy-coded data are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartMarkers {
    /// `RST` markers end one restart interval, and the scan data continues after them.
    #[default]
    Continue,
    /// `RST` markers end the scan data like any other marker.
    Stop,
}

/// The entropy-coded data following a scan header.
pub struct ScanData<'a> {
    offset: usize,
    data: &'a [u8],
    intervals: Vec<&'a [u8]>,
}

impl<'a> ScanData<'a> {
    /// Returns the offset of the scan data in the original JPEG stream.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the data in this scan, still byte-stuffed and including any contained `RST`
    /// markers.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the data of each restart interval, excluding the `RST` markers separating them.
    ///
    /// There is always at least one interval, which may be empty.
    #[inline]
    pub fn intervals(&self) -> &[&'a [u8]] {
        &self.intervals
    }
}

impl<'a> fmt::Debug for ScanData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanData")
            .field("offset", &self.offset)
            .field("data", &format_args!("{:x?}", self.data))
            .field(
                "intervals",
                &self.intervals.iter().map(|i| i.len()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Finds the end of the entropy-coded data starting at the position of `reader` and consumes it.
///
/// On success, `reader` is left on the `0xFF` byte that starts the terminating marker.
pub(crate) fn read_scan_data<'a>(
    reader: &mut Reader<'a>,
    restart_markers: RestartMarkers,
) -> Result<ScanData<'a>> {
    let offset = reader.position();
    let data = reader.remaining();

    let mut intervals = Vec::new();
    let mut interval_start = 0;
    let mut i = 0;
    let len = loop {
        match data[i..].iter().position(|&b| b == 0xff) {
            Some(pos) => i += pos,
            None => return Err(Error::from(ErrorKind::Truncated).at(offset + data.len())),
        }

        let Some(&next) = data.get(i + 1) else {
            return Err(Error::from(ErrorKind::Truncated).at(offset + data.len()));
        };

        match next {
            0x00 => {
                // Byte stuffing sequence, part of the data.
                i += 2;
            }
            0xD0..=0xD7 if restart_markers == RestartMarkers::Continue => {
                intervals.push(&data[interval_start..i]);
                i += 2;
                interval_start = i;
            }
            _ => break i,
        }
    };
    intervals.push(&data[interval_start..len]);

    log::trace!(
        "scan data at {:#x}: {} bytes in {} restart interval(s)",
        offset,
        len,
        intervals.len()
    );

    Ok(ScanData {
        offset,
        data: reader.read_slice(len)?,
        intervals,
    })
}
