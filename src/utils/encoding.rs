// Encoding utilities

use encoding_rs::{mem, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Text encodings used by ID3v2 frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Iso8859_1 = 0,
    Utf16 = 1,
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    /// Unknown encoding bytes fall back to ISO-8859-1
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => TextEncoding::Utf16,
            2 => TextEncoding::Utf16BE,
            3 => TextEncoding::Utf8,
            _ => TextEncoding::Iso8859_1,
        }
    }

    /// Width in bytes of the NUL terminator for this encoding
    pub fn terminator_width(self) -> usize {
        match self {
            TextEncoding::Utf16 | TextEncoding::Utf16BE => 2,
            TextEncoding::Iso8859_1 | TextEncoding::Utf8 => 1,
        }
    }

    /// `None` for ISO-8859-1, which encoding_rs only offers as windows-1252
    fn encoding(self) -> Option<&'static Encoding> {
        match self {
            TextEncoding::Iso8859_1 => None,
            // BOM sniffing picks the byte order, little-endian otherwise
            TextEncoding::Utf16 => Some(UTF_16LE),
            TextEncoding::Utf16BE => Some(UTF_16BE),
            TextEncoding::Utf8 => Some(UTF_8),
        }
    }
}

/// Coerce `data` into a trimmed UTF-8 string.
///
/// With no source encoding the bytes must already be valid UTF-8, otherwise the
/// result is empty. With a source encoding the bytes are transcoded and any
/// malformed or unmappable sequence is dropped.
pub fn encode_to_utf8(data: &[u8], source: Option<TextEncoding>) -> String {
    match source {
        None => match std::str::from_utf8(data) {
            Ok(text) => trim_text(text).to_owned(),
            Err(_) => String::new(),
        },
        Some(encoding) => {
            let text = match encoding.encoding() {
                Some(encoding) => transcode(data, encoding),
                // Every byte is the code point of the same value
                None => mem::decode_latin1(data).into_owned(),
            };
            trim_text(&text).to_owned()
        }
    }
}

/// Decode text with specified encoding
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    encode_to_utf8(data, Some(encoding))
}

/// Split `data` on the first NUL terminator of `width` bytes.
///
/// Terminators are only matched on `width`-aligned offsets so a UTF-16 code unit
/// ending in a zero byte is not mistaken for one. The second part keeps any further
/// terminators verbatim and is empty when none was found.
pub fn split_with_terminator(data: &[u8], width: usize) -> (&[u8], &[u8]) {
    let width = width.max(1);
    let position = data
        .chunks_exact(width)
        .position(|chunk| chunk.iter().all(|&b| b == 0));

    match position {
        Some(index) => {
            let start = index * width;
            (&data[..start], &data[start + width..])
        }
        None => (data, &data[data.len()..]),
    }
}

fn transcode(data: &[u8], encoding: &'static Encoding) -> String {
    let mut decoder = encoding.new_decoder();
    let mut output = String::with_capacity(data.len() * 2 + 4);
    let mut input = data;

    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut output, true);
        input = &input[read..];

        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(input.len() * 3 + 4);
                output.reserve(needed.max(4));
            }
            // Malformed sequences are dropped
            DecoderResult::Malformed(_, _) => {}
        }
    }

    output
}

fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_STRING: &str = "àáâã\u{80}\u{9f}äåæçèéêëìíîï";

    fn utf16(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        if bom {
            bytes.extend_from_slice(if big_endian { &[0xFE, 0xFF] } else { &[0xFF, 0xFE] });
        }
        for unit in text.encode_utf16() {
            if big_endian {
                bytes.extend_from_slice(&unit.to_be_bytes());
            } else {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_encode_to_utf8_round_trips() {
        let latin1: Vec<u8> = TEST_STRING.chars().map(|c| c as u32 as u8).collect();

        assert_eq!(
            encode_to_utf8(&latin1, Some(TextEncoding::Iso8859_1)),
            TEST_STRING
        );
        assert_eq!(
            encode_to_utf8(&utf16(TEST_STRING, true, true), Some(TextEncoding::Utf16)),
            TEST_STRING
        );
        assert_eq!(
            encode_to_utf8(&utf16(TEST_STRING, false, true), Some(TextEncoding::Utf16)),
            TEST_STRING
        );
        assert_eq!(
            encode_to_utf8(&utf16(TEST_STRING, true, false), Some(TextEncoding::Utf16BE)),
            TEST_STRING
        );
        assert_eq!(encode_to_utf8(TEST_STRING.as_bytes(), None), TEST_STRING);
    }

    #[test]
    fn test_encode_to_utf8_rejects_invalid_utf8() {
        assert_eq!(encode_to_utf8(&utf16(TEST_STRING, true, true), None), "");
    }

    #[test]
    fn test_encode_to_utf8_trims() {
        assert_eq!(encode_to_utf8(b"  Rock\0", None), "Rock");
        assert_eq!(encode_to_utf8(b"Rock\0\0", Some(TextEncoding::Iso8859_1)), "Rock");
    }

    #[test]
    fn test_malformed_sequences_are_dropped() {
        assert_eq!(encode_to_utf8(b"ab\xFFcd", Some(TextEncoding::Utf8)), "abcd");
    }

    #[test]
    fn test_split_with_terminator() {
        let (first, second) = split_with_terminator(b"hi\x00there\x00!", 1);
        assert_eq!(first, b"hi");
        assert_eq!(second, b"there\x00!");
    }

    #[test]
    fn test_split_with_wide_terminator() {
        // "a" then a UTF-16LE terminator then "b"
        let data = [0x61, 0x00, 0x00, 0x00, 0x62, 0x00];
        let (first, second) = split_with_terminator(&data, 2);
        assert_eq!(first, &[0x61, 0x00]);
        assert_eq!(second, &[0x62, 0x00]);
    }

    #[test]
    fn test_split_without_terminator() {
        let (first, second) = split_with_terminator(b"plain", 1);
        assert_eq!(first, b"plain");
        assert!(second.is_empty());
    }
}
