// FLAC metadata handling module
//
// FLAC streams are only read when mapped into Ogg ("Ogg FLAC"):
// - Identification packet: 0x7F "FLAC", mapping version (2 bytes), header
//   packet count (2 bytes), "fLaC", then the STREAMINFO block with its header
// - Comment packet: a VORBIS_COMMENT block with its 4 byte header

pub mod metadata;
pub mod picture;
pub mod vorbis;

pub use metadata::{FlacMetadataBlockHeader, FlacMetadataBlockType, StreamInfo, FLAC_SIGNATURE};
pub use picture::FlacPicture;
pub use vorbis::VorbisComment;

use crate::tag::RawTag;

/// Identification packet magic of the Ogg FLAC mapping
pub const OGG_FLAC_SIGNATURE: &[u8; 5] = b"\x7FFLAC";

/// Ogg FLAC headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlacTag {
    pub stream_info: StreamInfo,
}

impl FlacTag {
    // Magic, mapping version, header count, "fLaC"
    const STREAM_INFO_BLOCK_OFFSET: usize = 13;

    /// Parse the identification and comment packets
    ///
    /// Returns `None` if the identification packet carries no STREAMINFO.
    pub fn read(identification: &[u8], comment: &[u8], tag: &mut RawTag) -> Option<Self> {
        let signature = identification.get(9..13)?;
        if signature != FLAC_SIGNATURE {
            log::debug!("Ogg FLAC identification packet without a native FLAC signature");
            return None;
        }

        let block = identification.get(Self::STREAM_INFO_BLOCK_OFFSET..)?;
        let header = FlacMetadataBlockHeader::parse(block)?;
        if header.block_type != FlacMetadataBlockType::StreamInfo {
            return None;
        }
        let stream_info = StreamInfo::parse(&block[FlacMetadataBlockHeader::HEADER_SIZE..])?;

        match comment.get(FlacMetadataBlockHeader::HEADER_SIZE..) {
            Some(block) => VorbisComment::from_bytes(block).apply_to(tag),
            None => log::debug!("Ogg FLAC comment packet is too short"),
        }

        Some(FlacTag { stream_info })
    }

    pub fn sample_rate(&self) -> u32 {
        self.stream_info.sample_rate
    }

    pub fn bit_depth(&self) -> u32 {
        u32::from(self.stream_info.bits_per_sample)
    }
}
