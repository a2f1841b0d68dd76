mod common;

use common::*;
use tagscan::{AnyTag, Error};

#[test]
fn test_read_ogg_by_extension() {
    let (_dir, path) = temp_file("china_girl.opus", &opus_stream(312));
    let mut file = tagscan::read_from_path(&path).unwrap();

    assert!(matches!(file, AnyTag::Ogg(_)));
    assert_eq!(file.format_name(), "Ogg Opus");
    assert_eq!(file.tag().title(), Some("China Girl"));

    file.load_fully();
    assert!(file.tag().duration().is_some());
    let AnyTag::Ogg(ogg) = &file else { unreachable!() };
    assert!(ogg.is_closed());
}

#[test]
fn test_read_ogg_by_magic() {
    let (_dir, path) = temp_file("mislabelled.mp3", &vorbis_stream());
    let file = tagscan::read_from_path(&path).unwrap();

    assert_eq!(file.format_name(), "Ogg Vorbis");
    assert_eq!(file.into_tag().artist(), Some("Iggy Pop"));
}

#[test]
fn test_read_id3() {
    let frames = id3_frame(4, "TIT2", 0, &text_body(3, "Heroes"));
    let mut bytes = id3v2_tag(4, 0, &frames, 0);
    bytes.extend(audio_frames());
    let (_dir, path) = temp_file("heroes.mp3", &bytes);

    let file = tagscan::read_from_path(&path).unwrap();
    assert!(matches!(file, AnyTag::Id3(_)));
    assert_eq!(file.format_name(), "ID3v2.4.0");
    assert_eq!(file.tag().title(), Some("Heroes"));
}

#[test]
fn test_ogg_extension_with_id3_content() {
    let frames = id3_frame(3, "TIT2", 0, &text_body(0, "Heroes"));
    let (_dir, path) = temp_file("heroes.ogg", &id3v2_tag(3, 0, &frames, 0));

    let file = tagscan::read_from_path(&path).unwrap();
    assert_eq!(file.format_name(), "ID3v2.3.0");
}

#[test]
fn test_empty_file() {
    let (_dir, path) = temp_file("empty.mp3", &[]);
    let file = tagscan::read_from_path(&path).unwrap();

    assert_eq!(file.tag().file_size(), 0);
    assert_eq!(file.tag().title(), None);
}

#[test]
fn test_unsupported_format() {
    let (_dir, path) = temp_file("noise.wav", &audio_frames());

    let result = tagscan::read_from_path(&path);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let result = tagscan::read_from_path(dir.path().join("missing.mp3"));
    assert!(matches!(result, Err(Error::Io(_))));
}
