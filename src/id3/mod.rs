// ID3 metadata handling module
pub mod frames;
pub mod genres;
pub mod v1;
pub mod v2;

pub use v1::Id3v1Tag;
pub use v2::Id3v2Header;

use crate::tag::{RawTag, TagFile, TagFormat};

use std::fs::File;
use std::io::{self, Read, Seek};

/// An ID3 tagged file (usually MP3)
pub type Id3Tag<R = File> = TagFile<Id3Format, R>;

/// ID3 decoder state
///
/// An ID3v2 tag at the start of the stream takes precedence; the trailing ID3v1
/// block is only consulted when there is none.
#[derive(Debug, Default)]
pub struct Id3Format {
    header: Option<Id3v2Header>,
    has_v1: bool,
}

impl Id3Format {
    /// Header of the ID3v2 tag, if one was found
    pub fn header(&self) -> Option<&Id3v2Header> {
        self.header.as_ref()
    }

    /// Whether the data came from a trailing ID3v1 tag
    pub fn has_v1(&self) -> bool {
        self.has_v1
    }

    /// Whether any ID3 tag was found
    pub fn is_present(&self) -> bool {
        self.header.is_some() || self.has_v1
    }

    /// Human readable tag version
    pub fn version(&self) -> Option<String> {
        match (&self.header, self.has_v1) {
            (Some(header), _) => Some(header.version()),
            (None, true) => Some("1".to_string()),
            (None, false) => None,
        }
    }
}

impl TagFormat for Id3Format {
    fn parse<R: Read + Seek>(&mut self, reader: &mut R, tag: &mut RawTag) -> io::Result<()> {
        if let Some(header) = Id3v2Header::read(reader)? {
            log::debug!("Found ID3v{} tag, {} bytes", header.version(), header.tag_size());
            v2::read_frames(reader, &header, tag)?;
            self.header = Some(header);
            return Ok(());
        }

        if let Some(v1) = Id3v1Tag::read(reader)? {
            log::debug!("Found ID3v1 tag");
            v1.apply_to(tag);
            self.has_v1 = true;
        }

        Ok(())
    }
}
