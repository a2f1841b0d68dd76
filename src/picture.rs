// Embedded images
//
// ID3v2 (APIC/PIC) and FLAC picture blocks share the same picture type table.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Serialize, Serializer};

/// Picture types according to the ID3v2 / FLAC specifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    VideoScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
}

impl PictureType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }
}

/// A decoded embedded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
}

impl Image {
    /// Get file extension based on MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }
}

/// MIME type for an ID3v2.2 three character image format
pub(crate) fn mime_type_from_format(format: &str) -> String {
    match format.to_ascii_uppercase().as_str() {
        "JPG" | "JPEG" => "image/jpeg".to_string(),
        "PNG" => "image/png".to_string(),
        "GIF" => "image/gif".to_string(),
        "BMP" => "image/bmp".to_string(),
        other => format!("image/{}", other.to_ascii_lowercase()),
    }
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_type_lookup() {
        assert_eq!(PictureType::from_u32(3), PictureType::CoverFront);
        assert_eq!(PictureType::from_u32(3).as_str(), "Cover (front)");
        assert_eq!(PictureType::from_u32(255), PictureType::Other);
    }

    #[test]
    fn test_mime_type_from_format() {
        assert_eq!(mime_type_from_format("JPG"), "image/jpeg");
        assert_eq!(mime_type_from_format("png"), "image/png");
        assert_eq!(mime_type_from_format("XYZ"), "image/xyz");
    }

    #[test]
    fn test_image_serializes_data_as_base64() {
        let image = Image {
            mime_type: "image/png".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: vec![0, 1, 2],
        };

        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(value["data"], "AAEC");
        assert_eq!(image.extension(), "png");
    }
}
