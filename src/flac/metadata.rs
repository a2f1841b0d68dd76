// FLAC metadata block implementation

/// FLAC metadata block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlacMetadataBlockType {
    StreamInfo = 0,
    Padding = 1,
    Application = 2,
    SeekTable = 3,
    VorbisComment = 4,
    CueSheet = 5,
    Picture = 6,
    Invalid = 127,
}

impl FlacMetadataBlockType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => FlacMetadataBlockType::StreamInfo,
            1 => FlacMetadataBlockType::Padding,
            2 => FlacMetadataBlockType::Application,
            3 => FlacMetadataBlockType::SeekTable,
            4 => FlacMetadataBlockType::VorbisComment,
            5 => FlacMetadataBlockType::CueSheet,
            6 => FlacMetadataBlockType::Picture,
            _ => FlacMetadataBlockType::Invalid,
        }
    }
}

/// FLAC metadata block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlacMetadataBlockHeader {
    pub is_last: bool,
    pub block_type: FlacMetadataBlockType,
    pub length: u32,
}

impl FlacMetadataBlockHeader {
    pub const HEADER_SIZE: usize = 4;

    /// Parse a block header from the start of `data`
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = data.get(..Self::HEADER_SIZE)?;

        Some(FlacMetadataBlockHeader {
            is_last: (header[0] & 0x80) != 0,
            block_type: FlacMetadataBlockType::from_byte(header[0] & 0x7F),
            // Length is big-endian 24-bit
            length: u32::from_be_bytes([0, header[1], header[2], header[3]]),
        })
    }
}

/// Audio properties from a STREAMINFO block body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
    pub total_samples: u64,
}

impl StreamInfo {
    const SIZE: usize = 34;

    /// Parse a STREAMINFO body
    ///
    /// Bytes 10..18 hold sample rate (20 bits), channels - 1 (3 bits),
    /// bits per sample - 1 (5 bits) and total samples (36 bits).
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }

        let packed = &data[10..18];
        let sample_rate =
            (u32::from(packed[0]) << 12) | (u32::from(packed[1]) << 4) | (u32::from(packed[2]) >> 4);
        let channels = ((packed[2] >> 1) & 0x07) + 1;
        let bits_per_sample = (((packed[2] & 0x01) << 4) | (packed[3] >> 4)) + 1;
        let total_samples = (u64::from(packed[3] & 0x0F) << 32)
            | u64::from(u32::from_be_bytes([packed[4], packed[5], packed[6], packed[7]]));

        Some(StreamInfo {
            sample_rate,
            channels,
            bits_per_sample,
            total_samples,
        })
    }
}

/// FLAC file signature
pub const FLAC_SIGNATURE: &[u8; 4] = b"fLaC";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_header() {
        let header = FlacMetadataBlockHeader::parse(&[0x84, 0x00, 0x01, 0x02]).unwrap();
        assert!(header.is_last);
        assert_eq!(header.block_type, FlacMetadataBlockType::VorbisComment);
        assert_eq!(header.length, 258);

        assert!(FlacMetadataBlockHeader::parse(&[0x00, 0x00]).is_none());
    }

    #[test]
    fn test_stream_info() {
        let mut data = [0u8; 34];
        // 44100 Hz, 2 channels, 16 bits, 352800 samples
        data[10..18].copy_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x05, 0x62, 0x20]);

        let info = StreamInfo::parse(&data).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.total_samples, 352_800);

        assert!(StreamInfo::parse(&data[..20]).is_none());
    }
}
