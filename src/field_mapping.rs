// Tag field mapping
//
// Each format names its fields differently:
// - ID3v2.2: three character frame IDs (TT2, TP1, TAL, ...)
// - ID3v2.3/2.4: four character frame IDs (TIT2, TPE1, TALB, ...)
// - Vorbis Comment (Ogg Vorbis, Opus, FLAC): case-insensitive keys (TITLE, ARTIST, ...)
//
// Every table maps onto the same closed set of `TagField`s; anything not listed
// is ignored by the decoders.

/// Attributes a decoder can fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Composer,
    Genre,
    Year,
    Track,
    TrackTotal,
    Disc,
    DiscTotal,
    Comment,
    Lyrics,
    Image,
}

impl TagField {
    /// Get field name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::AlbumArtist => "albumartist",
            TagField::Composer => "composer",
            TagField::Genre => "genre",
            TagField::Year => "year",
            TagField::Track => "track",
            TagField::TrackTotal => "track_total",
            TagField::Disc => "disc",
            TagField::DiscTotal => "disc_total",
            TagField::Comment => "comment",
            TagField::Lyrics => "lyrics",
            TagField::Image => "image",
        }
    }
}

/// Format-specific field tables
pub struct FieldMappings;

impl FieldMappings {
    /// Look up an ID3v2 frame ID using the table for `major_version`
    pub fn from_id3v2(frame_id: &str, major_version: u8) -> Option<TagField> {
        match major_version {
            0..=2 => Self::from_id3v22(frame_id),
            3 => Self::from_id3v23(frame_id),
            _ => Self::from_id3v24(frame_id),
        }
    }

    /// ID3v2.2 frame IDs
    pub fn from_id3v22(frame_id: &str) -> Option<TagField> {
        match frame_id {
            "TT2" => Some(TagField::Title),
            "TP1" => Some(TagField::Artist),
            "TP2" => Some(TagField::AlbumArtist),
            "TAL" => Some(TagField::Album),
            "TCM" => Some(TagField::Composer),
            "TCO" => Some(TagField::Genre),
            "TYE" => Some(TagField::Year),
            "TRK" => Some(TagField::Track),
            "TPA" => Some(TagField::Disc),
            "COM" => Some(TagField::Comment),
            "ULT" => Some(TagField::Lyrics),
            "PIC" => Some(TagField::Image),
            _ => None,
        }
    }

    /// ID3v2.3 frame IDs
    pub fn from_id3v23(frame_id: &str) -> Option<TagField> {
        match frame_id {
            "TIT2" => Some(TagField::Title),
            "TPE1" => Some(TagField::Artist),
            "TPE2" => Some(TagField::AlbumArtist),
            "TALB" => Some(TagField::Album),
            "TCOM" => Some(TagField::Composer),
            "TCON" => Some(TagField::Genre),
            "TYER" => Some(TagField::Year),
            "TRCK" => Some(TagField::Track),
            "TPOS" => Some(TagField::Disc),
            "COMM" => Some(TagField::Comment),
            "USLT" => Some(TagField::Lyrics),
            "APIC" => Some(TagField::Image),
            _ => None,
        }
    }

    /// ID3v2.4 frame IDs
    ///
    /// v2.4 replaces TYER with TDRC, but v2.3 frames are still accepted since
    /// many writers mix them.
    pub fn from_id3v24(frame_id: &str) -> Option<TagField> {
        match frame_id {
            "TDRC" => Some(TagField::Year),
            _ => Self::from_id3v23(frame_id),
        }
    }

    /// Convert Vorbis Comment key to a tag field
    pub fn from_vorbis(key: &str) -> Option<TagField> {
        match key.to_ascii_uppercase().as_str() {
            "TITLE" => Some(TagField::Title),
            "ARTIST" => Some(TagField::Artist),
            "ALBUM" => Some(TagField::Album),
            "ALBUMARTIST" | "ALBUM ARTIST" => Some(TagField::AlbumArtist),
            "COMPOSER" => Some(TagField::Composer),
            "GENRE" => Some(TagField::Genre),
            "DATE" | "YEAR" => Some(TagField::Year),
            "TRACKNUMBER" => Some(TagField::Track),
            "TRACKTOTAL" | "TOTALTRACKS" => Some(TagField::TrackTotal),
            "DISCNUMBER" => Some(TagField::Disc),
            "DISCTOTAL" | "TOTALDISCS" => Some(TagField::DiscTotal),
            "COMMENT" | "DESCRIPTION" => Some(TagField::Comment),
            "LYRICS" | "UNSYNCEDLYRICS" => Some(TagField::Lyrics),
            "METADATA_BLOCK_PICTURE" => Some(TagField::Image),
            _ => None,
        }
    }
}
