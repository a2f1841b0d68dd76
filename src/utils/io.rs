// I/O utilities for reading tag structures

use std::io::{self, ErrorKind, Read};

/// Read big-endian 32-bit integer
pub fn read_be_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_be_bytes(buffer))
}

/// Read little-endian 32-bit integer
pub fn read_le_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

/// Read a length-prefixed (little-endian 32-bit) byte string
pub fn read_le_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let length = read_le_u32(reader)? as usize;
    let mut data = Vec::new();
    reader.take(length as u64).read_to_end(&mut data)?;
    if data.len() != length {
        return Err(ErrorKind::UnexpectedEof.into());
    }
    Ok(data)
}

/// Fill `buffer` completely, returning `false` if the stream ended first.
///
/// Any other I/O error is propagated.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buffer) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Decode a synchronization-safe integer.
///
/// ID3 sizes are encoded with bit 7 of every byte zeroed, giving 28 usable bits
/// over four bytes. With `has_zero_bit` unset every bit is significant and the
/// bytes are read as a plain big-endian integer.
pub fn synchsafe_int(bytes: &[u8], has_zero_bit: bool) -> u32 {
    bytes.iter().fold(0u32, |acc, &byte| {
        if has_zero_bit {
            (acc << 7) | u32::from(byte & 0x7F)
        } else {
            (acc << 8) | u32::from(byte)
        }
    })
}
