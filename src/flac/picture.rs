// FLAC PICTURE block implementation
//
// Also the payload of the base64 METADATA_BLOCK_PICTURE comment used by Ogg
// Vorbis and Opus.

use crate::picture::{Image, PictureType};
use crate::utils::encoding::encode_to_utf8;
use crate::utils::io::read_be_u32;

use std::io::{self, ErrorKind, Read};

/// FLAC PICTURE block structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlacPicture {
    pub picture_type: PictureType,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub colors: u32,
    pub data: Vec<u8>,
}

impl FlacPicture {
    /// Read FLAC PICTURE block from data
    pub fn read_from_data(data: &[u8]) -> io::Result<Self> {
        let mut reader = data;

        let picture_type = PictureType::from_u32(read_be_u32(&mut reader)?);
        let mime_type = encode_to_utf8(&read_be_prefixed(&mut reader)?, None);
        let description = encode_to_utf8(&read_be_prefixed(&mut reader)?, None);
        let width = read_be_u32(&mut reader)?;
        let height = read_be_u32(&mut reader)?;
        let depth = read_be_u32(&mut reader)?;
        let colors = read_be_u32(&mut reader)?;
        let picture_data = read_be_prefixed(&mut reader)?;

        Ok(FlacPicture {
            picture_type,
            mime_type,
            description,
            width,
            height,
            depth,
            colors,
            data: picture_data,
        })
    }

    pub fn into_image(self) -> Image {
        Image {
            mime_type: self.mime_type,
            picture_type: self.picture_type,
            description: self.description,
            data: self.data,
        }
    }
}

/// Decode a picture block, `None` if it is malformed or empty
pub(crate) fn read_picture(data: &[u8]) -> Option<Image> {
    match FlacPicture::read_from_data(data) {
        Ok(picture) if !picture.data.is_empty() => Some(picture.into_image()),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Invalid picture block: {e}");
            None
        }
    }
}

fn read_be_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let length = read_be_u32(reader)? as usize;
    let mut data = Vec::new();
    reader.take(length as u64).read_to_end(&mut data)?;
    if data.len() != length {
        return Err(ErrorKind::UnexpectedEof.into());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture_block(mime_type: &str, description: &str, data: &[u8]) -> Vec<u8> {
        let mut block = 3u32.to_be_bytes().to_vec();
        block.extend_from_slice(&(mime_type.len() as u32).to_be_bytes());
        block.extend_from_slice(mime_type.as_bytes());
        block.extend_from_slice(&(description.len() as u32).to_be_bytes());
        block.extend_from_slice(description.as_bytes());
        for value in [600u32, 600, 24, 0] {
            block.extend_from_slice(&value.to_be_bytes());
        }
        block.extend_from_slice(&(data.len() as u32).to_be_bytes());
        block.extend_from_slice(data);
        block
    }

    #[test]
    fn test_read_picture_block() {
        let block = picture_block("image/jpeg", "front", &[0xFF, 0xD8, 0xFF]);
        let picture = FlacPicture::read_from_data(&block).unwrap();

        assert_eq!(picture.picture_type, PictureType::CoverFront);
        assert_eq!(picture.mime_type, "image/jpeg");
        assert_eq!(picture.description, "front");
        assert_eq!(picture.width, 600);
        assert_eq!(picture.depth, 24);
        assert_eq!(picture.data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_truncated_block() {
        let block = picture_block("image/jpeg", "front", &[0xFF, 0xD8, 0xFF]);
        assert!(read_picture(&block[..block.len() - 1]).is_none());
        assert!(read_picture(&picture_block("image/png", "", &[])).is_none());
    }
}
