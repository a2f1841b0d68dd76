// ID3v2 tag implementation

use super::frames::{Frame, ParsedFrame};
use crate::tag::RawTag;
use crate::utils::io::{read_exact_or_eof, synchsafe_int};

use std::io::{self, Read, Seek, SeekFrom};

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3v2Header {
    pub major_version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag size excluding the 10 byte header
    pub size: u32,
}

impl Id3v2Header {
    pub const HEADER_SIZE: u64 = 10;
    const ID: [u8; 3] = [b'I', b'D', b'3'];

    /// Read the header at the start of the stream
    ///
    /// Returns `Ok(None)` if the stream does not start with an ID3v2 tag.
    pub fn read<R: Read + Seek>(reader: &mut R) -> io::Result<Option<Self>> {
        reader.seek(SeekFrom::Start(0))?;

        let mut buffer = [0u8; Self::HEADER_SIZE as usize];
        if !read_exact_or_eof(reader, &mut buffer)? || buffer[0..3] != Self::ID {
            return Ok(None);
        }

        Ok(Some(Id3v2Header {
            major_version: buffer[3],
            revision: buffer[4],
            flags: buffer[5],
            size: synchsafe_int(&buffer[6..10], true),
        }))
    }

    /// Second flag bit, an extended header follows
    ///
    /// In ID3v2.2 the same bit marks a compressed tag.
    pub fn has_extended_header(&self) -> bool {
        self.flags & 0x40 != 0
    }

    /// Total tag size, header included
    pub fn tag_size(&self) -> u64 {
        u64::from(self.size) + Self::HEADER_SIZE
    }

    /// Version as "2.major.revision"
    pub fn version(&self) -> String {
        format!("2.{}.{}", self.major_version, self.revision)
    }
}

/// Read every frame of the tag described by `header` into `tag`
///
/// The stream must be positioned right after the header.
pub(crate) fn read_frames<R: Read + Seek>(
    reader: &mut R,
    header: &Id3v2Header,
    tag: &mut RawTag,
) -> io::Result<()> {
    if header.has_extended_header() {
        if header.major_version == 2 {
            log::debug!("Compressed ID3v2.2 tags are not supported");
            return Ok(());
        }
        if !skip_extended_header(reader, header.major_version)? {
            log::debug!("Truncated extended header, stopping");
            return Ok(());
        }
    }

    let tag_size = header.tag_size();
    while reader.stream_position()? < tag_size {
        match Frame::read(reader, header.major_version)? {
            ParsedFrame::Next(frame) => frame.apply_to(tag),
            ParsedFrame::Skip => {}
            ParsedFrame::Eof => break,
        }
    }

    Ok(())
}

/// Returns `false` if the stream ends inside the size field
fn skip_extended_header<R: Read + Seek>(reader: &mut R, major_version: u8) -> io::Result<bool> {
    let mut size = [0u8; 4];
    if !read_exact_or_eof(reader, &mut size)? {
        return Ok(false);
    }

    // v2.4 counts the size field itself, v2.3 does not
    let skip = if major_version >= 4 {
        i64::from(synchsafe_int(&size, true).saturating_sub(4))
    } else {
        i64::from(synchsafe_int(&size, false))
    };

    log::trace!("Skipping {skip} byte extended header");
    reader.seek(SeekFrom::Current(skip))?;
    Ok(true)
}
