// ID3v2 frame reading and frame body decoders

use super::genres;
use crate::field_mapping::{FieldMappings, TagField};
use crate::picture::{mime_type_from_format, Image, PictureType};
use crate::tag::{RawImage, RawTag};
use crate::utils::encoding::{decode_text, encode_to_utf8, split_with_terminator, TextEncoding};
use crate::utils::io::{read_exact_or_eof, synchsafe_int};

use flate2::read::ZlibDecoder;
use std::io::{self, Read, Seek, SeekFrom};

/// Frame status flags, normalized across v2.3 and v2.4
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameFlags {
    pub grouping: bool,
    pub compression: bool,
    pub encryption: bool,
    pub unsynchronisation: bool,
    pub data_length_indicator: bool,
}

impl FrameFlags {
    /// Parse the format flags byte pair of a v2.3 or v2.4 frame header
    ///
    /// ID3v2.2 frames carry no flags.
    pub fn parse(flags: u16, major_version: u8) -> Self {
        match major_version {
            3 => FrameFlags {
                compression: flags & 0x0080 != 0,
                encryption: flags & 0x0040 != 0,
                grouping: flags & 0x0020 != 0,
                ..Default::default()
            },
            4 => FrameFlags {
                grouping: flags & 0x0040 != 0,
                compression: flags & 0x0008 != 0,
                encryption: flags & 0x0004 != 0,
                unsynchronisation: flags & 0x0002 != 0,
                data_length_indicator: flags & 0x0001 != 0,
            },
            _ => FrameFlags::default(),
        }
    }

    /// Number of header bytes inserted ahead of the frame data
    fn extra_bytes(&self, major_version: u8) -> usize {
        let mut extra = usize::from(self.grouping) + usize::from(self.encryption);
        match major_version {
            3 if self.compression => extra += 4,
            4 if self.data_length_indicator => extra += 4,
            _ => {}
        }
        extra
    }
}

/// A recognized frame with its decoded payload
#[derive(Debug)]
pub(crate) struct Frame {
    pub id: String,
    pub field: TagField,
    pub major_version: u8,
    pub data: Vec<u8>,
}

/// Outcome of reading one frame
#[derive(Debug)]
pub(crate) enum ParsedFrame {
    Next(Frame),
    /// Unknown or undecodable frame, already skipped over
    Skip,
    /// Padding or a truncated frame; nothing more to read
    Eof,
}

impl Frame {
    pub(crate) fn read<R: Read + Seek>(reader: &mut R, major_version: u8) -> io::Result<ParsedFrame> {
        let (id_len, header_len) = if major_version == 2 { (3, 6) } else { (4, 10) };

        let mut header = [0u8; 10];
        if !read_exact_or_eof(reader, &mut header[..header_len])? {
            log::debug!("Truncated frame header, stopping");
            return Ok(ParsedFrame::Eof);
        }

        // Padding
        if header[0] == 0 {
            return Ok(ParsedFrame::Eof);
        }

        let id_bytes = &header[..id_len];
        if !id_bytes
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            log::debug!("Invalid frame ID {:?}, stopping", String::from_utf8_lossy(id_bytes));
            return Ok(ParsedFrame::Eof);
        }
        let id = String::from_utf8_lossy(id_bytes).into_owned();

        let (size, flags) = match major_version {
            2 => (synchsafe_int(&header[3..6], false), FrameFlags::default()),
            3 => (
                synchsafe_int(&header[4..8], false),
                FrameFlags::parse(u16::from_be_bytes([header[8], header[9]]), 3),
            ),
            _ => (
                synchsafe_int(&header[4..8], true),
                FrameFlags::parse(u16::from_be_bytes([header[8], header[9]]), 4),
            ),
        };

        let Some(field) = FieldMappings::from_id3v2(&id, major_version) else {
            log::trace!("Skipping unmapped frame {id} ({size} bytes)");
            reader.seek(SeekFrom::Current(i64::from(size)))?;
            return Ok(ParsedFrame::Skip);
        };

        let mut content = Vec::new();
        reader.by_ref().take(u64::from(size)).read_to_end(&mut content)?;
        if content.len() != size as usize {
            log::debug!("Frame {id} is truncated, stopping");
            return Ok(ParsedFrame::Eof);
        }

        match decode_content(content, flags, major_version) {
            Some(data) => Ok(ParsedFrame::Next(Frame {
                id,
                field,
                major_version,
                data,
            })),
            None => {
                log::debug!("Dropping frame {id}");
                Ok(ParsedFrame::Skip)
            }
        }
    }

    /// Decode the frame body and store it in `tag`
    pub(crate) fn apply_to(self, tag: &mut RawTag) {
        let value = match self.field {
            TagField::Image => {
                tag.push_image(RawImage::Id3 {
                    major_version: self.major_version,
                    data: self.data,
                });
                return;
            }
            TagField::Comment | TagField::Lyrics => decode_comment_frame(&self.data),
            TagField::Genre => genres::resolve(&decode_text_frame(&self.data)),
            _ => decode_text_frame(&self.data),
        };

        log::trace!("{} ({}) = {:?}", self.id, self.field.as_str(), value);
        tag.set_field(self.field, value);
    }
}

/// Strip the flag-dependent header bytes and undo unsynchronisation and compression
///
/// Returns `None` for frames that cannot be decoded.
fn decode_content(content: Vec<u8>, flags: FrameFlags, major_version: u8) -> Option<Vec<u8>> {
    if flags.encryption {
        log::debug!("Encrypted frames are not supported");
        return None;
    }

    let extra = flags.extra_bytes(major_version);
    if content.len() < extra {
        return None;
    }

    let mut data = if extra == 0 {
        content
    } else {
        content[extra..].to_vec()
    };

    if flags.unsynchronisation {
        data = unsynchronise(&data);
    }

    if flags.compression {
        data = inflate(&data)?;
    }

    Some(data)
}

/// Remove the zero byte inserted after every 0xFF
pub(crate) fn unsynchronise(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut previous = 0u8;

    for &byte in data {
        if !(previous == 0xFF && byte == 0x00) {
            output.push(byte);
        }
        previous = byte;
    }

    output
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut output = Vec::new();
    match ZlibDecoder::new(data).read_to_end(&mut output) {
        Ok(_) => Some(output),
        Err(e) => {
            log::warn!("Failed to decompress frame: {e}");
            None
        }
    }
}

/// Decode a text frame, keeping the first value of a multi-value frame
pub(crate) fn decode_text_frame(data: &[u8]) -> String {
    let Some((&encoding_byte, text)) = data.split_first() else {
        return String::new();
    };

    let encoding = TextEncoding::from_byte(encoding_byte);
    let (value, _) = split_with_terminator(text, encoding.terminator_width());
    decode_text(value, encoding)
}

/// Decode the text of a comment or unsynchronised lyrics frame
///
/// Layout: encoding, 3-byte language, description, text.
pub(crate) fn decode_comment_frame(data: &[u8]) -> String {
    if data.len() < 4 {
        return String::new();
    }

    let encoding = TextEncoding::from_byte(data[0]);
    let (_description, text) = split_with_terminator(&data[4..], encoding.terminator_width());
    decode_text(text, encoding)
}

/// Decode an APIC (v2.3/v2.4) or PIC (v2.2) frame body
pub(crate) fn decode_picture(data: &[u8], major_version: u8) -> Option<Image> {
    let (&encoding_byte, rest) = data.split_first()?;
    let encoding = TextEncoding::from_byte(encoding_byte);

    let (mime_type, rest) = if major_version == 2 {
        if rest.len() < 3 {
            return None;
        }
        let (format, rest) = rest.split_at(3);
        (mime_type_from_format(&String::from_utf8_lossy(format)), rest)
    } else {
        let (mime_type, rest) = split_with_terminator(rest, 1);
        let mime_type = encode_to_utf8(mime_type, Some(TextEncoding::Iso8859_1)).to_ascii_lowercase();
        if mime_type.contains('/') {
            (mime_type, rest)
        } else {
            (mime_type_from_format(&mime_type), rest)
        }
    };

    let (&picture_type, rest) = rest.split_first()?;
    let (description, image_data) = split_with_terminator(rest, encoding.terminator_width());
    if image_data.is_empty() {
        return None;
    }

    Some(Image {
        mime_type,
        picture_type: PictureType::from_u32(u32::from(picture_type)),
        description: decode_text(description, encoding),
        data: image_data.to_vec(),
    })
}
