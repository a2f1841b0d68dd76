// Byte and string helpers shared by the decoders

pub mod encoding;
pub mod io;

use std::ffi::OsStr;
use std::path::Path;

/// Lower-cased file extension without the leading dot
///
/// Only used to pick which decoder to try first; decoders validate magic bytes themselves.
pub fn file_format<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Convert a 16-byte mixed-endian GUID (as stored by ASF containers) into its
/// canonical hyphenated, upper-case form.
pub fn guid_from_bytes(bytes: &[u8; 16]) -> String {
    let data1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let data2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let data3 = u16::from_le_bytes([bytes[6], bytes[7]]);
    let node: String = bytes[10..].iter().map(|b| format!("{b:02X}")).collect();

    format!(
        "{data1:08X}-{data2:04X}-{data3:04X}-{:02X}{:02X}-{node}",
        bytes[8], bytes[9]
    )
}
