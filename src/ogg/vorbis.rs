// Ogg Vorbis headers
//
// Identification header: 0x01 "vorbis", version (4), channels (1),
// sample rate (4), maximum/nominal/minimum bitrate (4 each, signed), all
// little-endian. The comment header is 0x03 "vorbis" followed by a Vorbis
// comment block.

use crate::flac::vorbis::VorbisComment;
use crate::tag::RawTag;

pub const VORBIS_IDENT_HEAD: &[u8; 7] = b"\x01vorbis";
pub const VORBIS_COMMENT_HEAD: &[u8; 7] = b"\x03vorbis";

/// Vorbis identification header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VorbisTag {
    pub channels: u8,
    pub sample_rate: u32,
    pub bitrate_maximum: i32,
    pub bitrate_nominal: i32,
    pub bitrate_minimum: i32,
}

impl VorbisTag {
    const IDENT_SIZE: usize = 28;

    /// Parse the identification and comment packets
    ///
    /// Returns `None` if the identification packet is too short.
    pub fn read(identification: &[u8], comment: &[u8], tag: &mut RawTag) -> Option<Self> {
        if identification.len() < Self::IDENT_SIZE {
            log::debug!("Vorbis identification header is truncated");
            return None;
        }

        let le_u32 = |offset: usize| {
            u32::from_le_bytes([
                identification[offset],
                identification[offset + 1],
                identification[offset + 2],
                identification[offset + 3],
            ])
        };

        let vorbis = VorbisTag {
            channels: identification[11],
            sample_rate: le_u32(12),
            bitrate_maximum: le_u32(16) as i32,
            bitrate_nominal: le_u32(20) as i32,
            bitrate_minimum: le_u32(24) as i32,
        };

        match comment.strip_prefix(VORBIS_COMMENT_HEAD.as_slice()) {
            Some(block) => VorbisComment::from_bytes(block).apply_to(tag),
            None => log::debug!("Missing Vorbis comment header"),
        }

        Some(vorbis)
    }

    /// Nominal bitrate in kbps, when the encoder declared one
    pub fn bitrate(&self) -> Option<u32> {
        (self.bitrate_nominal > 0).then(|| (self.bitrate_nominal / 1000) as u32)
    }
}
