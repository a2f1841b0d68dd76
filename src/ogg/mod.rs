// Ogg container support
//
// OGG File Structure:
// - OGG Page Header (27 bytes)
//   - Capture Pattern: "OggS" (4 bytes)
//   - Version: 0 (1 byte)
//   - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
//   - Granule Position (8 bytes)
//   - Bitstream Serial Number (4 bytes)
//   - Page Sequence Number (4 bytes)
//   - CRC Checksum (4 bytes)
//   - Number of Page Segments (1 byte)
//   - Segment Table (variable)
//
// The first packet identifies the codec (Vorbis, Opus or FLAC), the second
// carries the comments. Duration is not stored anywhere: it comes from the
// granule position of the last page, so it is only computed on request.

pub mod packets;
pub mod page;
pub mod vorbis;

pub use packets::Packets;
pub use page::{OggPage, OggPageHeader, Pages};
pub use vorbis::VorbisTag;

use crate::flac::{FlacTag, OGG_FLAC_SIGNATURE};
use crate::opus::{OpusTag, OPUS_SAMPLE_RATE, OPUS_SIGNATURE};
use crate::tag::{Deferred, RawTag, Tag, TagFile, TagFormat};

use std::fs::File;
use std::io::{self, Read, Seek};

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

// OGG page header types
pub(crate) const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub(crate) const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub(crate) const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream

/// An Ogg Vorbis, Opus or FLAC file
pub type OggTag<R = File> = TagFile<OggFormat, R>;

/// Codec carried by the logical stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OggVariant {
    Vorbis(VorbisTag),
    Opus(OpusTag),
    Flac(FlacTag),
}

impl OggVariant {
    /// Pick the codec from the identification packet magic
    pub fn read(identification: &[u8], comment: &[u8], tag: &mut RawTag) -> Option<Self> {
        if identification.starts_with(vorbis::VORBIS_IDENT_HEAD) {
            VorbisTag::read(identification, comment, tag).map(OggVariant::Vorbis)
        } else if identification.starts_with(OPUS_SIGNATURE) {
            OpusTag::read(identification, comment, tag).map(OggVariant::Opus)
        } else if identification.starts_with(OGG_FLAC_SIGNATURE) {
            FlacTag::read(identification, comment, tag).map(OggVariant::Flac)
        } else {
            log::debug!("Unknown Ogg codec");
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OggVariant::Vorbis(_) => "Vorbis",
            OggVariant::Opus(_) => "Opus",
            OggVariant::Flac(_) => "FLAC",
        }
    }

    pub fn sample_rate(&self) -> u32 {
        match self {
            OggVariant::Vorbis(vorbis) => vorbis.sample_rate,
            OggVariant::Opus(_) => OPUS_SAMPLE_RATE,
            OggVariant::Flac(flac) => flac.sample_rate(),
        }
    }

    /// Samples to drop from the decoded stream
    pub fn pre_skip(&self) -> u64 {
        match self {
            OggVariant::Opus(opus) => u64::from(opus.pre_skip),
            _ => 0,
        }
    }

    /// Bitrate declared in the headers, in kbps
    pub fn bitrate(&self) -> Option<u32> {
        match self {
            OggVariant::Vorbis(vorbis) => vorbis.bitrate(),
            _ => None,
        }
    }

    pub fn bit_depth(&self) -> Option<u32> {
        match self {
            OggVariant::Flac(flac) => Some(flac.bit_depth()),
            _ => None,
        }
    }
}

/// Ogg decoder state
///
/// Duration and bitrate are computed on first request through `OggTag` and
/// memoized. Computing the duration reads to the end of the stream.
#[derive(Debug, Default)]
pub struct OggFormat {
    variant: Option<OggVariant>,
    overhead_packets_size: u64,
    serial: Option<u32>,
    last_granule_position: Option<u64>,
    duration: Deferred<Option<f64>>,
    bitrate: Deferred<Option<u32>>,
}

impl OggFormat {
    pub fn variant(&self) -> Option<&OggVariant> {
        self.variant.as_ref()
    }

    /// Combined size of the identification and comment packets
    pub fn overhead_packets_size(&self) -> u64 {
        self.overhead_packets_size
    }

    /// Whether the duration has been computed
    pub fn is_duration_loaded(&self) -> bool {
        self.duration.is_forced()
    }

    /// Whether the bitrate has been computed
    pub fn is_bitrate_loaded(&self) -> bool {
        self.bitrate.is_forced()
    }

    fn force_duration<R: Read>(&mut self, reader: Option<&mut R>) -> Option<f64> {
        if let Deferred::Forced(duration) = self.duration {
            return duration;
        }

        let duration = self.scan_duration(reader);
        self.duration = Deferred::Forced(duration);
        duration
    }

    fn force_bitrate<R: Read>(&mut self, reader: Option<&mut R>, file_size: u64) -> Option<u32> {
        if let Deferred::Forced(bitrate) = self.bitrate {
            return bitrate;
        }

        let bitrate = self.compute_bitrate(reader, file_size);
        self.bitrate = Deferred::Forced(bitrate);
        bitrate
    }

    /// (last granule position - pre-skip) / sample rate
    fn scan_duration<R: Read>(&self, reader: Option<&mut R>) -> Option<f64> {
        let variant = self.variant.as_ref()?;
        let sample_rate = variant.sample_rate();
        if sample_rate == 0 {
            return None;
        }

        let mut last_granule = self.last_granule_position;
        if let Some(reader) = reader {
            for page in Pages::new(reader) {
                if self.serial.is_some_and(|serial| serial != page.header.bitstream_serial) {
                    continue;
                }
                if let Some(granule) = page.header.complete_granule_position() {
                    last_granule = Some(granule);
                }
            }
        }

        let samples = last_granule?.saturating_sub(variant.pre_skip());
        Some(samples as f64 / f64::from(sample_rate))
    }

    fn compute_bitrate<R: Read>(&mut self, reader: Option<&mut R>, file_size: u64) -> Option<u32> {
        if let Some(bitrate) = self.variant.as_ref()?.bitrate() {
            return Some(bitrate);
        }

        let duration = self.force_duration(reader)?;
        if duration <= 0.0 {
            return None;
        }

        let payload = file_size.saturating_sub(self.overhead_packets_size);
        Some((payload as f64 * 8.0 / duration / 1000.0).round() as u32)
    }
}

impl TagFormat for OggFormat {
    fn parse<R: Read + Seek>(&mut self, reader: &mut R, tag: &mut RawTag) -> io::Result<()> {
        let mut packets = Packets::new(reader);
        let (Some(identification), Some(comment)) = (packets.next(), packets.next()) else {
            log::debug!("Missing Ogg header packets");
            return Ok(());
        };

        self.serial = packets.serial();
        self.last_granule_position = packets.last_granule_position();
        self.overhead_packets_size = (identification.len() + comment.len()) as u64;

        self.variant = OggVariant::read(&identification, &comment, tag);
        if let Some(variant) = &self.variant {
            log::debug!("Found Ogg {} stream", variant.name());
            tag.set_sample_rate(variant.sample_rate());
            if let Some(bit_depth) = variant.bit_depth() {
                tag.set_bit_depth(bit_depth);
            }
        }

        Ok(())
    }

    /// The stream stays open until the duration has been read from it
    fn defers_reads(&self) -> bool {
        self.variant.is_some() && !self.duration.is_forced()
    }

    fn load_deferred<R: Read + Seek>(&mut self, reader: Option<&mut R>, tag: &mut Tag) {
        tag.duration = self.force_duration(reader);
        tag.bitrate = self.force_bitrate::<R>(None, tag.file_size());
    }
}

impl<R: Read + Seek> TagFile<OggFormat, R> {
    /// Duration in seconds
    ///
    /// The first call reads the rest of the stream; afterwards a stream opened
    /// by path is closed.
    pub fn duration(&mut self) -> Option<f64> {
        let (format, reader, tag) = self.parts_mut();
        let duration = format.force_duration(reader);
        tag.duration = duration;
        self.release_stream();
        duration
    }

    /// Bitrate in kbps
    ///
    /// Falls back to an estimate from the file size, which needs the duration.
    pub fn bitrate(&mut self) -> Option<u32> {
        let (format, reader, tag) = self.parts_mut();
        let bitrate = format.force_bitrate(reader, tag.file_size());
        tag.bitrate = bitrate;
        tag.duration = format.duration.get().flatten();
        self.release_stream();
        bitrate
    }
}
