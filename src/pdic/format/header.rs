//! PDIC container header parsing.
//!
//! The header is a fixed 256-byte region at the start of the file. Only a
//! handful of its fields matter for walking the container; the rest is
//! bookkeeping for the PDIC editor.
//!
//! ```text
//! 0x00  [100]  header name (NUL padded)
//! 0x8c  u16    version, high byte is the major version
//! 0x94  u16    index region size in 1024-byte units
//! 0xa0  u32    word count
//! 0xa5  u8     dictype flags
//! 0xb6  u8     index block id width (0 = 16-bit, 1 = 32-bit)
//! 0xb8  u32    extended header size in bytes
//! 0xc0  u32    number of index entries
//! 0xc4  u32    number of used blocks
//! ```
//!
//! All integers are little-endian.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::SHIFT_JIS;
use log::{debug, info, trace, warn};

use crate::pdic::types::{
    error::{PdicError, Result},
    models::{DicType, IntWidth, PdicHeader, HEADER_SIZE},
};

const HEADER_NAME_LEN: usize = 100;
const OFFSET_VERSION: usize = 0x8c;
const OFFSET_INDEX_BLOCK: usize = 0x94;
const OFFSET_NWORD: usize = 0xa0;
const OFFSET_DICTYPE: usize = 0xa5;
const OFFSET_INDEX_BLKBIT: usize = 0xb6;
const OFFSET_EXTHEADER: usize = 0xb8;
const OFFSET_NINDEX2: usize = 0xc0;
const OFFSET_NBLOCK2: usize = 0xc4;

/// The only major version this reader understands.
pub const SUPPORTED_MAJOR_VERSION: u8 = 6;

/// Reads and validates the header from a reader positioned at the start of a
/// PDIC file.
///
/// # Errors
/// - [`PdicError::Truncated`] if fewer than 256 bytes are available
/// - [`PdicError::Encrypted`] if the encryption bit is set
/// - [`PdicError::UnsupportedVersion`] if the major version is not 6
/// - [`PdicError::InvalidFormat`] if the index width selector is unknown
pub fn parse<R: Read>(file: &mut R) -> Result<PdicHeader> {
    info!("Parsing PDIC header");

    let mut buf = [0u8; HEADER_SIZE];
    file.read_exact(&mut buf).map_err(PdicError::from_read("header"))?;

    parse_bytes(&buf)
}

/// Parses an in-memory copy of the header region.
pub fn parse_bytes(buf: &[u8; HEADER_SIZE]) -> Result<PdicHeader> {
    let dictype = DicType::from(buf[OFFSET_DICTYPE]);
    trace!("dictype: {:#04x}", dictype.raw);
    if dictype.encrypted {
        return Err(PdicError::Encrypted);
    }

    let version = LittleEndian::read_u16(&buf[OFFSET_VERSION..]);
    if (version >> 8) as u8 != SUPPORTED_MAJOR_VERSION {
        return Err(PdicError::UnsupportedVersion(version));
    }

    if !dictype.bocu1 {
        warn!(
            "dictype {:#04x} does not declare BOCU-1 text; decoding as BOCU-1 anyway",
            dictype.raw
        );
    }
    if dictype.compressed_binary {
        debug!("Dictionary may contain compressed binary sub-records; they will be skipped");
    }

    let index_width = IntWidth::try_from(buf[OFFSET_INDEX_BLKBIT])?;

    let header = PdicHeader {
        title: decode_title(&buf[..HEADER_NAME_LEN]),
        version,
        index_block: LittleEndian::read_u16(&buf[OFFSET_INDEX_BLOCK..]),
        nword: LittleEndian::read_u32(&buf[OFFSET_NWORD..]),
        dictype,
        index_width,
        extheader: LittleEndian::read_u32(&buf[OFFSET_EXTHEADER..]),
        nindex2: LittleEndian::read_u32(&buf[OFFSET_NINDEX2..]),
        nblock2: LittleEndian::read_u32(&buf[OFFSET_NBLOCK2..]),
    };

    info!(
        "Header parsed successfully: version={:#06x}, title='{}', index entries={}, index width={}-bit, words={}",
        header.version,
        header.title,
        header.nindex2,
        header.index_width.byte_width() * 8,
        header.nword
    );

    Ok(header)
}

/// The header name is written by the Japanese editor in its ANSI code page.
fn decode_title(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let (text, _, had_errors) = SHIFT_JIS.decode(&raw[..end]);
    if had_errors {
        debug!("Header name is not valid Shift_JIS; replacement characters substituted");
    }
    text.trim().to_string()
}
