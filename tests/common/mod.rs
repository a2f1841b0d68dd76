#![allow(dead_code)]

//! Builders for synthetic ID3v2 and Ogg streams

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Write;
use std::path::PathBuf;

pub const SERIAL: u32 = 0x0A0B_0C0D;
pub const LYRICS: &str = "I'm feeling tragic like I'm Marlon Brando";

// ---- Ogg ----

/// Lays packets out as Ogg pages
pub struct OggBuilder {
    bytes: Vec<u8>,
    sequence: u32,
    continued: bool,
}

impl OggBuilder {
    pub fn new() -> Self {
        OggBuilder {
            bytes: Vec::new(),
            sequence: 0,
            continued: false,
        }
    }

    /// Append `packets`, at most `max_segments` segments per page
    ///
    /// Pages completing a packet get `granule`, the others `u64::MAX`.
    pub fn packets(mut self, packets: &[&[u8]], granule: u64, max_segments: usize, eos: bool) -> Self {
        let mut segments: Vec<(&[u8], bool)> = Vec::new();
        for packet in packets {
            let mut offset = 0;
            loop {
                let len = (packet.len() - offset).min(255);
                segments.push((&packet[offset..offset + len], len < 255));
                offset += len;
                if len < 255 {
                    break;
                }
            }
        }

        let pages: Vec<_> = segments.chunks(max_segments).collect();
        for (index, page) in pages.iter().enumerate() {
            let mut header_type = 0u8;
            if self.continued {
                header_type |= 0x01;
            }
            if self.sequence == 0 {
                header_type |= 0x02;
            }
            if eos && index == pages.len() - 1 {
                header_type |= 0x04;
            }

            let completes_packet = page.iter().any(|(_, end)| *end);
            let page_granule = if completes_packet { granule } else { u64::MAX };

            self.bytes.extend_from_slice(b"OggS");
            self.bytes.push(0);
            self.bytes.push(header_type);
            self.bytes.extend_from_slice(&page_granule.to_le_bytes());
            self.bytes.extend_from_slice(&SERIAL.to_le_bytes());
            self.bytes.extend_from_slice(&self.sequence.to_le_bytes());
            self.bytes.extend_from_slice(&0u32.to_le_bytes());
            self.bytes.push(page.len() as u8);
            for (segment, _) in page.iter() {
                self.bytes.push(segment.len() as u8);
            }
            for (segment, _) in page.iter() {
                self.bytes.extend_from_slice(segment);
            }

            self.continued = page.last().is_some_and(|(_, end)| !*end);
            self.sequence += 1;
        }

        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A Vorbis comment block
pub fn comment_block(entries: &[String]) -> Vec<u8> {
    let vendor = b"tagscan test vendor";
    let mut block = (vendor.len() as u32).to_le_bytes().to_vec();
    block.extend_from_slice(vendor);
    block.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        block.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        block.extend_from_slice(entry.as_bytes());
    }
    block
}

/// The comment entries shared by the Ogg fixtures
pub fn china_girl_comments() -> Vec<String> {
    [
        "TITLE=China Girl",
        "ARTIST=Iggy Pop",
        "ALBUMARTIST=Iggy Pop",
        "COMPOSER=Iggy Pop",
        "ALBUM=The Idiot",
        "DATE=1977",
        "GENRE=Rock",
        "TRACKNUMBER=5",
        "DISCNUMBER=1",
        "ENCODER=test",
    ]
    .iter()
    .map(|entry| entry.to_string())
    .chain(std::iter::once(format!("LYRICS={LYRICS}")))
    .collect()
}

pub fn vorbis_identification(sample_rate: u32, nominal_bitrate: i32) -> Vec<u8> {
    let mut packet = b"\x01vorbis".to_vec();
    packet.extend_from_slice(&0u32.to_le_bytes());
    packet.push(2);
    packet.extend_from_slice(&sample_rate.to_le_bytes());
    packet.extend_from_slice(&0i32.to_le_bytes());
    packet.extend_from_slice(&nominal_bitrate.to_le_bytes());
    packet.extend_from_slice(&0i32.to_le_bytes());
    packet.push(0xB8);
    packet.push(0x01);
    packet
}

pub fn vorbis_comment(entries: &[String]) -> Vec<u8> {
    let mut packet = b"\x03vorbis".to_vec();
    packet.extend(comment_block(entries));
    packet.push(0x01);
    packet
}

pub fn opus_head(pre_skip: u16) -> Vec<u8> {
    let mut packet = b"OpusHead".to_vec();
    packet.push(1);
    packet.push(2);
    packet.extend_from_slice(&pre_skip.to_le_bytes());
    packet.extend_from_slice(&44100u32.to_le_bytes());
    packet.extend_from_slice(&0i16.to_le_bytes());
    packet.push(0);
    packet
}

pub fn opus_tags(entries: &[String]) -> Vec<u8> {
    let mut packet = b"OpusTags".to_vec();
    packet.extend(comment_block(entries));
    packet
}

/// Ogg FLAC identification packet for 44.1 kHz, stereo, 16 bit
pub fn flac_identification() -> Vec<u8> {
    let mut packet = b"\x7FFLAC".to_vec();
    packet.extend_from_slice(&[1, 0]);
    packet.extend_from_slice(&1u16.to_be_bytes());
    packet.extend_from_slice(b"fLaC");
    packet.extend_from_slice(&[0x00, 0x00, 0x00, 34]);

    let mut stream_info = [0u8; 34];
    stream_info[0..2].copy_from_slice(&4096u16.to_be_bytes());
    stream_info[2..4].copy_from_slice(&4096u16.to_be_bytes());
    stream_info[10..18].copy_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x05, 0x62, 0x20]);
    packet.extend_from_slice(&stream_info);
    packet
}

pub fn flac_comment(entries: &[String]) -> Vec<u8> {
    let block = comment_block(entries);
    let len = block.len() as u32;
    let mut packet = vec![0x84, (len >> 16) as u8, (len >> 8) as u8, len as u8];
    packet.extend(block);
    packet
}

/// FLAC picture block wrapped as a METADATA_BLOCK_PICTURE comment entry
pub fn picture_comment(mime_type: &str, data: &[u8]) -> String {
    let mut block = 3u32.to_be_bytes().to_vec();
    block.extend_from_slice(&(mime_type.len() as u32).to_be_bytes());
    block.extend_from_slice(mime_type.as_bytes());
    block.extend_from_slice(&5u32.to_be_bytes());
    block.extend_from_slice(b"front");
    for value in [1u32, 1, 24, 0] {
        block.extend_from_slice(&value.to_be_bytes());
    }
    block.extend_from_slice(&(data.len() as u32).to_be_bytes());
    block.extend_from_slice(data);

    format!("METADATA_BLOCK_PICTURE={}", STANDARD.encode(block))
}

/// A complete stream: header packets, then audio ending at `final_granule`
///
/// Headers use at most `header_segments` segments per page so long comment
/// packets span pages.
pub fn ogg_stream(
    identification: &[u8],
    comment: &[u8],
    extra_headers: &[&[u8]],
    audio_packets: usize,
    final_granule: u64,
    header_segments: usize,
) -> Vec<u8> {
    let mut builder = OggBuilder::new()
        .packets(&[identification], 0, 255, false)
        .packets(&[comment], 0, header_segments, false);
    if !extra_headers.is_empty() {
        builder = builder.packets(extra_headers, 0, 255, false);
    }

    let audio = vec![0x5Au8; 1000];
    for index in 1..=audio_packets {
        let granule = final_granule * index as u64 / audio_packets as u64;
        builder = builder.packets(&[&audio], granule, 255, index == audio_packets);
    }

    builder.build()
}

pub fn vorbis_stream() -> Vec<u8> {
    ogg_stream(
        &vorbis_identification(44100, 192_000),
        &vorbis_comment(&china_girl_comments()),
        &[b"\x05vorbis setup"],
        20,
        352_800,
        255,
    )
}

pub fn opus_stream(pre_skip: u16) -> Vec<u8> {
    ogg_stream(
        &opus_head(pre_skip),
        &opus_tags(&china_girl_comments()),
        &[],
        20,
        384_000 + u64::from(pre_skip),
        255,
    )
}

pub fn flac_stream() -> Vec<u8> {
    ogg_stream(
        &flac_identification(),
        &flac_comment(&china_girl_comments()),
        &[],
        20,
        352_800,
        255,
    )
}

// ---- ID3v2 ----

pub fn synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// A frame for the given major version
pub fn id3_frame(major_version: u8, id: &str, flags: u16, body: &[u8]) -> Vec<u8> {
    let mut frame = id.as_bytes().to_vec();
    let size = body.len() as u32;
    match major_version {
        2 => frame.extend_from_slice(&size.to_be_bytes()[1..]),
        3 => frame.extend_from_slice(&size.to_be_bytes()),
        _ => frame.extend_from_slice(&synchsafe(size)),
    }
    if major_version > 2 {
        frame.extend_from_slice(&flags.to_be_bytes());
    }
    frame.extend_from_slice(body);
    frame
}

/// A text frame body
///
/// Encoding 0 is written as Latin-1, 1 as UTF-16LE with a BOM, 2 as UTF-16BE,
/// 3 as UTF-8.
pub fn text_body(encoding: u8, text: &str) -> Vec<u8> {
    let mut body = vec![encoding];
    body.extend(encode(encoding, text));
    body
}

/// A comment or lyrics frame body with an empty description
pub fn comment_body(encoding: u8, text: &str) -> Vec<u8> {
    let mut body = vec![encoding];
    body.extend_from_slice(b"eng");
    body.extend(encode(encoding, ""));
    body.extend(terminator(encoding));
    body.extend(encode(encoding, text));
    body
}

fn encode(encoding: u8, text: &str) -> Vec<u8> {
    match encoding {
        0 => text.chars().map(|c| c as u32 as u8).collect(),
        1 => {
            let mut bytes = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        }
        2 => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        _ => text.as_bytes().to_vec(),
    }
}

fn terminator(encoding: u8) -> Vec<u8> {
    if encoding == 1 || encoding == 2 {
        vec![0, 0]
    } else {
        vec![0]
    }
}

/// ID3v2 header followed by `body` and `padding` zero bytes
pub fn id3v2_tag(major_version: u8, flags: u8, body: &[u8], padding: usize) -> Vec<u8> {
    let mut tag = b"ID3".to_vec();
    tag.push(major_version);
    tag.push(0);
    tag.push(flags);
    tag.extend_from_slice(&synchsafe((body.len() + padding) as u32));
    tag.extend_from_slice(body);
    tag.extend(std::iter::repeat(0u8).take(padding));
    tag
}

/// Fake MPEG audio following a tag
pub fn audio_frames() -> Vec<u8> {
    std::iter::repeat([0xFFu8, 0xFB, 0x90, 0x64]).take(256).flatten().collect()
}

// ---- Files ----

/// Write `bytes` to a temporary file named `name`
pub fn temp_file(name: &str, bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    (dir, path)
}
