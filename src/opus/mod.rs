// OPUS format support (in OGG container)
//
// OPUS File Structure:
// - Identification header: "OpusHead" (8 bytes), version (1), channel count (1),
//   pre-skip (2, LE), input sample rate (4, LE), output gain (2), mapping family (1)
// - Comment header: "OpusTags" (8 bytes) followed by a Vorbis Comment
// - Audio data pages
//
// Reference:
// - https://wiki.xiph.org/OggOpus
// - RFC 7845: Ogg Encapsulation for the Opus Audio Codec

use crate::flac::vorbis::VorbisComment;
use crate::tag::RawTag;

pub const OPUS_SIGNATURE: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";

/// Opus always decodes at 48 kHz, whatever the input rate was
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Opus identification header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusTag {
    pub version: u8,
    pub channels: u8,
    /// Samples to discard from the start of the decoded stream
    pub pre_skip: u16,
    pub input_sample_rate: u32,
}

impl OpusTag {
    const HEAD_SIZE: usize = 19;

    /// Parse the identification and comment packets
    ///
    /// Returns `None` if the identification packet is too short.
    pub fn read(identification: &[u8], comment: &[u8], tag: &mut RawTag) -> Option<Self> {
        if identification.len() < Self::HEAD_SIZE {
            log::debug!("OpusHead is truncated");
            return None;
        }

        let opus = OpusTag {
            version: identification[8],
            channels: identification[9],
            pre_skip: u16::from_le_bytes([identification[10], identification[11]]),
            input_sample_rate: u32::from_le_bytes([
                identification[12],
                identification[13],
                identification[14],
                identification[15],
            ]),
        };

        match comment.strip_prefix(OPUS_TAGS.as_slice()) {
            Some(block) => VorbisComment::from_bytes(block).apply_to(tag),
            None => log::debug!("Missing OpusTags header"),
        }

        Some(opus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_head() {
        let mut head = OPUS_SIGNATURE.to_vec();
        head.extend_from_slice(&[1, 2]);
        head.extend_from_slice(&312u16.to_le_bytes());
        head.extend_from_slice(&44100u32.to_le_bytes());
        head.extend_from_slice(&[0, 0, 0]);

        let mut raw = RawTag::default();
        let opus = OpusTag::read(&head, b"OpusTags", &mut raw).unwrap();

        assert_eq!(opus.version, 1);
        assert_eq!(opus.channels, 2);
        assert_eq!(opus.pre_skip, 312);
        assert_eq!(opus.input_sample_rate, 44100);

        assert!(OpusTag::read(&head[..12], b"", &mut raw).is_none());
    }
}
