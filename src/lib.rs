//! Audio metadata extraction
//!
//! Reads ID3 (v1, v2.2, v2.3, v2.4) tags and Ogg Vorbis, Opus and FLAC
//! comment headers into a common [`Tag`].
//!
//! ```no_run
//! let mut file = tagscan::read_from_path("song.opus")?;
//! file.load_fully();
//! println!("{:?} ({:?} s)", file.tag().title(), file.tag().duration());
//! # Ok::<(), tagscan::Error>(())
//! ```

pub mod error;
pub mod field_mapping;
pub mod flac;
pub mod id3;
pub mod ogg;
pub mod opus;
pub mod picture;
pub mod tag;
pub mod utils;

pub use error::{Error, Result};
pub use field_mapping::TagField;
pub use id3::{Id3Format, Id3Tag};
pub use ogg::{OggFormat, OggTag, OggVariant};
pub use picture::{Image, PictureType};
pub use tag::{RawImage, RawTag, Tag, TagFile, TagFormat};

use std::fs::File;
use std::io;
use std::path::Path;

/// A tag read by [`read_from_path`]
#[derive(Debug)]
pub enum AnyTag {
    Id3(Id3Tag),
    Ogg(OggTag),
}

impl AnyTag {
    /// The extracted metadata
    pub fn tag(&self) -> &Tag {
        match self {
            AnyTag::Id3(file) => file.tag(),
            AnyTag::Ogg(file) => file.tag(),
        }
    }

    /// Realize every lazily computed attribute and release the file
    pub fn load_fully(&mut self) {
        match self {
            AnyTag::Id3(file) => file.load_fully(),
            AnyTag::Ogg(file) => file.load_fully(),
        }
    }

    /// Take the metadata, dropping the file
    pub fn into_tag(self) -> Tag {
        match self {
            AnyTag::Id3(file) => file.into_tag(),
            AnyTag::Ogg(file) => file.into_tag(),
        }
    }

    /// Human readable format, e.g. "ID3v2.4.0" or "Ogg Opus"
    pub fn format_name(&self) -> String {
        match self {
            AnyTag::Id3(file) => match file.format().version() {
                Some(version) => format!("ID3v{version}"),
                None => "ID3".to_string(),
            },
            AnyTag::Ogg(file) => match file.format().variant() {
                Some(variant) => format!("Ogg {}", variant.name()),
                None => "Ogg".to_string(),
            },
        }
    }
}

/// Read the tag of the file at `path`
///
/// Ogg is tried first for Ogg extensions or when the file starts with an Ogg
/// page, ID3 otherwise. An empty file yields an empty tag.
///
/// # Errors
///
/// * [`Error::Io`] if the file cannot be opened or read
/// * [`Error::UnsupportedFormat`] if no decoder recognizes the file
pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<AnyTag> {
    let path = path.as_ref();

    let ogg_extension = matches!(
        utils::file_format(path).as_str(),
        "ogg" | "oga" | "opus" | "spx"
    );
    if ogg_extension || starts_with_ogg_page(path)? {
        let file = OggTag::open(path)?;
        if file.format().variant().is_some() {
            return Ok(AnyTag::Ogg(file));
        }
        log::debug!("{} is not a supported Ogg stream", path.display());
    }

    let file = Id3Tag::open(path)?;
    if file.format().is_present() || file.tag().file_size() == 0 {
        return Ok(AnyTag::Id3(file));
    }

    Err(Error::UnsupportedFormat(path.display().to_string()))
}

fn starts_with_ogg_page(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    Ok(utils::io::read_exact_or_eof(&mut file, &mut magic)? && &magic == ogg::OGG_SIGNATURE)
}
