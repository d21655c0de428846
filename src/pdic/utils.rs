//! Low-level byte reading utilities

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::pdic::types::models::IntWidth;

/// Read a 2 or 4 byte little-endian unsigned integer.
///
/// Used for index block ids, field lengths and binary sub-record lengths.
/// Works on files and on byte slices (a `&[u8]` reader advances past the value).
pub fn read_uint(reader: &mut impl Read, width: IntWidth) -> io::Result<u32> {
    match width {
        IntWidth::U16 => Ok(u32::from(reader.read_u16::<LittleEndian>()?)),
        IntWidth::U32 => reader.read_u32::<LittleEndian>(),
    }
}

/// Splits a NUL-terminated run off the front of `reader`.
///
/// Returns the bytes before the terminator and advances past it. A run that
/// reaches the end of the slice without a terminator is returned whole.
pub fn take_cstr<'a>(reader: &mut &'a [u8]) -> &'a [u8] {
    match reader.iter().position(|&b| b == 0) {
        Some(end) => {
            let run = &reader[..end];
            *reader = &reader[end + 1..];
            run
        }
        None => std::mem::take(reader),
    }
}

/// Skips a NUL-terminated run in a stream, returning the number of bytes
/// skipped (terminator excluded).
pub fn skip_cstr(reader: &mut impl Read) -> io::Result<usize> {
    let mut skipped = 0;
    while reader.read_u8()? != 0 {
        skipped += 1;
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_cstr_advances_past_terminator() {
        let mut data: &[u8] = b"ab\0cd\0";
        assert_eq!(take_cstr(&mut data), b"ab");
        assert_eq!(take_cstr(&mut data), b"cd");
        assert!(data.is_empty());
    }

    #[test]
    fn take_cstr_without_terminator_takes_rest() {
        let mut data: &[u8] = b"tail";
        assert_eq!(take_cstr(&mut data), b"tail");
        assert!(data.is_empty());
    }

    #[test]
    fn read_uint_widths() {
        let mut data: &[u8] = &[0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        assert_eq!(read_uint(&mut data, IntWidth::U16).unwrap(), 0x1234);
        assert_eq!(read_uint(&mut data, IntWidth::U32).unwrap(), 0x12345678);
        assert!(read_uint(&mut data, IntWidth::U16).is_err());
    }

    #[test]
    fn skip_cstr_consumes_terminator() {
        let mut data: &[u8] = b"key\0\x05";
        assert_eq!(skip_cstr(&mut data).unwrap(), 3);
        assert_eq!(data, &[0x05]);
    }
}
