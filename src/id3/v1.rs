// ID3v1 tag implementation

use super::genres;
use crate::field_mapping::TagField;
use crate::tag::RawTag;
use crate::utils::encoding::{decode_text, TextEncoding};

use std::io::{self, Read, Seek, SeekFrom};

/// ID3v1 tag structure
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: Option<&'static str>,
}

impl Id3v1Tag {
    const TAG_SIZE: usize = 128;
    const TAG_ID: [u8; 3] = [b'T', b'A', b'G'];

    /// Read the trailing ID3v1 tag, if any
    pub fn read<R: Read + Seek>(reader: &mut R) -> io::Result<Option<Self>> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        if stream_len < Self::TAG_SIZE as u64 {
            return Ok(None);
        }

        reader.seek(SeekFrom::End(-(Self::TAG_SIZE as i64)))?;
        let mut buffer = [0u8; Self::TAG_SIZE];
        reader.read_exact(&mut buffer)?;

        // Check for TAG identifier
        if buffer[0..3] != Self::TAG_ID {
            return Ok(None);
        }

        Ok(Some(Self::parse(&buffer)))
    }

    /// Parse ID3v1 tag from buffer
    fn parse(buffer: &[u8; 128]) -> Self {
        let title = Self::parse_string(&buffer[3..33]);
        let artist = Self::parse_string(&buffer[33..63]);
        let album = Self::parse_string(&buffer[63..93]);
        let year = Self::parse_string(&buffer[93..97]);

        // ID3v1.1 stores the track in the last byte of the comment
        let (comment, track) = if buffer[125] == 0 && buffer[126] != 0 {
            (Self::parse_string(&buffer[97..125]), Some(buffer[126]))
        } else {
            (Self::parse_string(&buffer[97..127]), None)
        };

        Id3v1Tag {
            title,
            artist,
            album,
            year,
            comment,
            track,
            genre: genres::get(usize::from(buffer[127])),
        }
    }

    /// Parse null-terminated string
    fn parse_string(bytes: &[u8]) -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        decode_text(&bytes[..end], TextEncoding::Iso8859_1)
    }

    pub(crate) fn apply_to(self, tag: &mut RawTag) {
        tag.set_field(TagField::Title, self.title);
        tag.set_field(TagField::Artist, self.artist);
        tag.set_field(TagField::Album, self.album);
        tag.set_field(TagField::Year, self.year);
        tag.set_field(TagField::Comment, self.comment);
        if let Some(track) = self.track {
            tag.set_field(TagField::Track, track.to_string());
        }
        if let Some(genre) = self.genre {
            tag.set_field(TagField::Genre, genre.to_string());
        }
    }
}
