use crate::ogg::{OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS, OGG_SIGNATURE};
use crate::utils::io::read_exact_or_eof;

use std::io::{self, Read};

/// OGG Page Header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPageHeader {
    pub version: u8,
    pub header_type: u8,
    /// Absolute granule position, `u64::MAX` if no packet ends on this page
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

/// OGG Page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPage {
    pub header: OggPageHeader,
    pub data: Vec<u8>,
}

impl OggPageHeader {
    const SIZE: usize = 27;

    /// Read OGG page header from a reader
    ///
    /// Returns `Ok(None)` at the end of the stream, on a bad capture pattern or
    /// an unknown version.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut header = [0u8; Self::SIZE];
        if !read_exact_or_eof(reader, &mut header)? {
            return Ok(None);
        }

        if &header[0..4] != OGG_SIGNATURE {
            log::debug!("Missing OggS capture pattern");
            return Ok(None);
        }

        let version = header[4];
        if version != 0 {
            log::debug!("Unsupported Ogg version {version}");
            return Ok(None);
        }

        let le_u32 = |offset: usize| {
            u32::from_le_bytes([header[offset], header[offset + 1], header[offset + 2], header[offset + 3]])
        };

        let mut granule = [0u8; 8];
        granule.copy_from_slice(&header[6..14]);

        let mut segment_table = vec![0u8; usize::from(header[26])];
        if !read_exact_or_eof(reader, &mut segment_table)? {
            return Ok(None);
        }

        Ok(Some(OggPageHeader {
            version,
            header_type: header[5],
            granule_position: u64::from_le_bytes(granule),
            bitstream_serial: le_u32(14),
            page_sequence: le_u32(18),
            crc: le_u32(22),
            segment_table,
        }))
    }

    /// Calculate total page data size from segment table
    pub fn data_size(&self) -> usize {
        self.segment_table.iter().map(|&x| usize::from(x)).sum()
    }

    /// First segment continues a packet from the previous page
    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    /// Check if this is the last page of a stream
    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }

    /// Granule position, unless no packet completes on this page
    pub fn complete_granule_position(&self) -> Option<u64> {
        (self.granule_position != u64::MAX).then_some(self.granule_position)
    }
}

impl OggPage {
    /// Read OGG page from a reader
    ///
    /// A page whose body is cut short counts as the end of the stream.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Option<Self>> {
        let Some(header) = OggPageHeader::read(reader)? else {
            return Ok(None);
        };

        let mut data = vec![0u8; header.data_size()];
        if !read_exact_or_eof(reader, &mut data)? {
            log::debug!("Ogg page {} is truncated", header.page_sequence);
            return Ok(None);
        }

        Ok(Some(OggPage { header, data }))
    }

    /// Iterate over the data of each segment
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut offset = 0;
        self.header.segment_table.iter().map(move |&len| {
            let start = offset;
            offset += usize::from(len);
            &self.data[start..offset]
        })
    }
}

/// Lazy, forward-only sequence of pages
///
/// Ends at the end of the stream or at the first invalid page. I/O errors are
/// logged and also end the sequence.
pub struct Pages<'a, R> {
    reader: &'a mut R,
    done: bool,
}

impl<'a, R: Read> Pages<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Pages { reader, done: false }
    }
}

impl<R: Read> Iterator for Pages<'_, R> {
    type Item = OggPage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match OggPage::read(&mut *self.reader) {
            Ok(Some(page)) => {
                log::trace!(
                    "Ogg page {} (serial {}, granule {})",
                    page.header.page_sequence,
                    page.header.bitstream_serial,
                    page.header.granule_position
                );
                Some(page)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                log::warn!("Failed to read Ogg page: {e}");
                self.done = true;
                None
            }
        }
    }
}
