// Vorbis comment block, shared by Ogg Vorbis, Opus and FLAC

use crate::field_mapping::{FieldMappings, TagField};
use crate::tag::{RawImage, RawTag};
use crate::utils::encoding::encode_to_utf8;
use crate::utils::io::{read_le_prefixed, read_le_u32};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::{self, ErrorKind, Read};

/// Vorbis comment structure
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VorbisComment {
    pub vendor_string: String,
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    /// Read Vorbis comment from reader
    ///
    /// A block that ends early keeps the entries read so far. Entries without
    /// a `=` are dropped.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let vendor_string = encode_to_utf8(&read_le_prefixed(reader)?, None);
        let comment_count = read_le_u32(reader)?;

        let mut comments = Vec::new();
        for _ in 0..comment_count {
            let entry = match read_le_prefixed(reader) {
                Ok(entry) => entry,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    log::debug!("Comment block ended after {} of {comment_count} entries", comments.len());
                    break;
                }
                Err(e) => return Err(e),
            };

            let Some(separator) = entry.iter().position(|&b| b == b'=') else {
                log::warn!("Skipping comment entry without a key");
                continue;
            };

            let key = String::from_utf8_lossy(&entry[..separator]).into_owned();
            let value = encode_to_utf8(&entry[separator + 1..], None);
            comments.push((key, value));
        }

        Ok(VorbisComment {
            vendor_string,
            comments,
        })
    }

    /// Parse a comment block held in memory, empty if it is unreadable
    pub fn from_bytes(mut data: &[u8]) -> Self {
        Self::read(&mut data).unwrap_or_else(|e| {
            log::debug!("Unreadable comment block: {e}");
            Self::default()
        })
    }

    /// Copy every mapped entry into `tag`, in block order
    pub(crate) fn apply_to(&self, tag: &mut RawTag) {
        for (key, value) in &self.comments {
            match FieldMappings::from_vorbis(key) {
                Some(TagField::Image) => match STANDARD.decode(value.trim()) {
                    Ok(block) => tag.push_image(RawImage::FlacPicture(block)),
                    Err(e) => log::warn!("Invalid METADATA_BLOCK_PICTURE: {e}"),
                },
                Some(field) => tag.set_field(field, value.clone()),
                None => log::trace!("Ignoring comment {key}"),
            }
        }
    }
}
