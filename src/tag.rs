// Tag lifecycle
//
// A `TagFile` owns the stream it reads from, sizes it, hands it to exactly one
// `TagFormat` decoder, then freezes the result into a `Tag`. Integer fields are
// collected as raw strings while parsing and only converted once the decoder
// has finished.

use crate::error::Result;
use crate::field_mapping::TagField;
use crate::picture::Image;

use serde::Serialize;
use std::cell::OnceCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A format decoder
///
/// `parse` is called at most once, with the stream rewound to the start.
/// Formats that need the stream after construction report it through
/// `defers_reads`.
pub trait TagFormat: Default {
    /// Decode the stream into `tag`
    ///
    /// Structures that are not present or end early are not errors; only I/O
    /// failures are propagated.
    fn parse<R: Read + Seek>(&mut self, reader: &mut R, tag: &mut RawTag) -> io::Result<()>;

    /// Whether the stream must stay open after parsing
    fn defers_reads(&self) -> bool {
        false
    }

    /// Force every deferred attribute into `tag`
    ///
    /// `reader` is `None` once the stream has been closed.
    fn load_deferred<R: Read + Seek>(&mut self, _reader: Option<&mut R>, _tag: &mut Tag) {}
}

/// Embedded image bytes as found in the tag, decoded on first access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawImage {
    /// APIC (v2.3/v2.4) or PIC (v2.2) frame body
    Id3 { major_version: u8, data: Vec<u8> },
    /// FLAC picture block, as carried by METADATA_BLOCK_PICTURE
    FlacPicture(Vec<u8>),
}

impl RawImage {
    fn decode(&self) -> Option<Image> {
        match self {
            RawImage::Id3 {
                major_version,
                data,
            } => crate::id3::frames::decode_picture(data, *major_version),
            RawImage::FlacPicture(data) => crate::flac::picture::read_picture(data),
        }
    }
}

#[derive(Debug, Default)]
struct RawNumbers {
    track: Option<String>,
    track_total: Option<String>,
    disc: Option<String>,
    disc_total: Option<String>,
}

/// Attributes collected by a decoder before normalization
#[derive(Debug, Default)]
pub struct RawTag {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    album_artist: Option<String>,
    composer: Option<String>,
    genre: Option<String>,
    year: Option<String>,
    lyrics: Option<String>,
    comments: Vec<String>,
    numbers: RawNumbers,
    images: Vec<RawImage>,
    sample_rate: Option<u32>,
    bit_depth: Option<u32>,
}

impl RawTag {
    /// Assign a decoded value to `field`
    ///
    /// Comments accumulate. Track and disc values may carry a total after a `/`.
    /// Empty values are ignored.
    pub fn set_field(&mut self, field: TagField, value: String) {
        if value.is_empty() {
            return;
        }

        match field {
            TagField::Title => self.title = Some(value),
            TagField::Artist => self.artist = Some(value),
            TagField::Album => self.album = Some(value),
            TagField::AlbumArtist => self.album_artist = Some(value),
            TagField::Composer => self.composer = Some(value),
            TagField::Genre => self.genre = Some(value),
            TagField::Year => self.year = Some(value),
            TagField::Lyrics => self.lyrics = Some(value),
            TagField::Comment => self.comments.push(value),
            TagField::Track => {
                let (count, total) = split_count(value);
                self.numbers.track = Some(count);
                if total.is_some() {
                    self.numbers.track_total = total;
                }
            }
            TagField::Disc => {
                let (count, total) = split_count(value);
                self.numbers.disc = Some(count);
                if total.is_some() {
                    self.numbers.disc_total = total;
                }
            }
            TagField::TrackTotal => self.numbers.track_total = Some(value),
            TagField::DiscTotal => self.numbers.disc_total = Some(value),
            TagField::Image => log::debug!("Ignoring text value for an image field"),
        }
    }

    pub fn push_image(&mut self, image: RawImage) {
        self.images.push(image);
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = Some(sample_rate);
    }

    pub fn set_bit_depth(&mut self, bit_depth: u32) {
        self.bit_depth = Some(bit_depth);
    }

    pub(crate) fn finish(self, file_size: u64) -> Tag {
        Tag {
            title: self.title,
            artist: self.artist,
            album: self.album,
            album_artist: self.album_artist,
            composer: self.composer,
            genre: self.genre,
            year: self.year,
            track: coerce_integer(self.numbers.track),
            track_total: coerce_integer(self.numbers.track_total),
            disc: coerce_integer(self.numbers.disc),
            disc_total: coerce_integer(self.numbers.disc_total),
            comments: self.comments,
            lyrics: self.lyrics,
            duration: None,
            bitrate: None,
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
            file_size,
            images_data: self.images,
            images: OnceCell::new(),
        }
    }
}

fn split_count(value: String) -> (String, Option<String>) {
    match value.split_once('/') {
        Some((count, total)) => {
            let total = total.trim();
            (
                count.to_string(),
                (!total.is_empty()).then(|| total.to_string()),
            )
        }
        None => (value, None),
    }
}

/// Leading decimal digits of `value`, or `None` if there are none
fn coerce_integer(value: Option<String>) -> Option<u32> {
    let value = value?;
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Extracted metadata
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tag {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    #[serde(rename = "albumartist")]
    album_artist: Option<String>,
    composer: Option<String>,
    genre: Option<String>,
    year: Option<String>,
    track: Option<u32>,
    track_total: Option<u32>,
    disc: Option<u32>,
    disc_total: Option<u32>,
    comments: Vec<String>,
    lyrics: Option<String>,
    pub(crate) duration: Option<f64>,
    pub(crate) bitrate: Option<u32>,
    sample_rate: Option<u32>,
    bit_depth: Option<u32>,
    file_size: u64,
    #[serde(skip)]
    images_data: Vec<RawImage>,
    #[serde(skip)]
    images: OnceCell<Vec<Image>>,
}

impl Tag {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn album_artist(&self) -> Option<&str> {
        self.album_artist.as_deref()
    }

    pub fn composer(&self) -> Option<&str> {
        self.composer.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn track(&self) -> Option<u32> {
        self.track
    }

    pub fn track_total(&self) -> Option<u32> {
        self.track_total
    }

    pub fn disc(&self) -> Option<u32> {
        self.disc
    }

    pub fn disc_total(&self) -> Option<u32> {
        self.disc_total
    }

    /// Comments in the order they appear in the tag
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    /// Duration in seconds
    ///
    /// For Ogg streams this stays `None` until the duration has been forced
    /// through the owning `OggTag`.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Bitrate in kbps
    pub fn bitrate(&self) -> Option<u32> {
        self.bitrate
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Bits per sample, for formats that record it
    pub fn bit_depth(&self) -> Option<u32> {
        self.bit_depth
    }

    /// Size of the source in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Embedded images, decoded on the first call
    ///
    /// Images that fail to decode are left out.
    pub fn images(&self) -> &[Image] {
        if self.images_data.is_empty() {
            return &[];
        }

        self.images.get_or_init(|| {
            self.images_data
                .iter()
                .filter_map(|raw| {
                    let image = raw.decode();
                    if image.is_none() {
                        log::warn!("Failed to decode embedded image, discarding");
                    }
                    image
                })
                .collect()
        })
    }
}

/// Two-state cell for an attribute computed on first access
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Deferred<T> {
    Unforced,
    Forced(T),
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Deferred::Unforced
    }
}

impl<T: Copy> Deferred<T> {
    pub(crate) fn get(&self) -> Option<T> {
        match self {
            Deferred::Unforced => None,
            Deferred::Forced(value) => Some(*value),
        }
    }

    pub(crate) fn is_forced(&self) -> bool {
        matches!(self, Deferred::Forced(_))
    }
}

#[derive(Debug)]
struct Stream<R> {
    reader: Option<R>,
    owned: bool,
}

impl<R> Stream<R> {
    fn get_mut(&mut self) -> Option<&mut R> {
        self.reader.as_mut()
    }

    /// Drop the reader if we opened it; a caller-supplied reader stays open
    fn close(&mut self) {
        if self.owned && self.reader.take().is_some() {
            log::trace!("Closed owned stream");
        }
    }
}

/// A tag bound to the stream it was read from
#[derive(Debug)]
pub struct TagFile<F, R> {
    format: F,
    tag: Tag,
    stream: Stream<R>,
}

impl<F: TagFormat> TagFile<F, File> {
    /// Open `path` and read its tag
    ///
    /// The file is closed as soon as no further reads are needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading tag from {}", path.display());

        let file = File::open(path)?;
        Self::construct(Stream {
            reader: Some(file),
            owned: true,
        })
    }
}

impl<F: TagFormat, R: Read + Seek> TagFile<F, R> {
    /// Read a tag from an already open stream
    ///
    /// The stream is never closed by the tag; pass `&mut reader` to keep using
    /// it afterwards.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::construct(Stream {
            reader: Some(reader),
            owned: false,
        })
    }

    fn construct(mut stream: Stream<R>) -> Result<Self> {
        let mut format = F::default();
        let mut raw = RawTag::default();
        let mut file_size = 0;

        if let Some(reader) = stream.get_mut() {
            file_size = stream_len(reader)?;

            if file_size > 0 {
                format.parse(reader, &mut raw)?;
            } else {
                log::debug!("Empty stream, nothing to parse");
            }
        }

        let mut tag_file = Self {
            format,
            tag: raw.finish(file_size),
            stream,
        };
        tag_file.release_stream();

        Ok(tag_file)
    }

    /// The extracted metadata
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Format-specific details
    pub fn format(&self) -> &F {
        &self.format
    }

    /// Take the metadata, dropping the stream
    pub fn into_tag(self) -> Tag {
        self.tag
    }

    /// Give back the stream, if still held
    pub fn into_inner(self) -> Option<R> {
        self.stream.reader
    }

    /// Whether the stream has been released
    pub fn is_closed(&self) -> bool {
        self.stream.reader.is_none()
    }

    /// Current position of the stream, `None` once it has been closed
    pub fn stream_position(&mut self) -> Option<u64> {
        self.stream.get_mut()?.stream_position().ok()
    }

    /// Realize every lazily computed attribute
    ///
    /// Afterwards no further reads are needed: a stream opened by path is
    /// closed, a caller-supplied one is left open.
    pub fn load_fully(&mut self) {
        let _ = self.tag.images();
        self.format.load_deferred(self.stream.get_mut(), &mut self.tag);
        self.release_stream();
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut F, Option<&mut R>, &mut Tag) {
        (&mut self.format, self.stream.reader.as_mut(), &mut self.tag)
    }

    pub(crate) fn release_stream(&mut self) {
        if !self.format.defers_reads() {
            self.stream.close();
        }
    }
}

/// Total length of the stream; parsing always starts from the beginning
fn stream_len<R: Seek>(reader: &mut R) -> io::Result<u64> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.rewind()?;
    Ok(len)
}
