//! Core data structures for PDIC format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Container header and its flag bytes
//! - Field record flags and extension sub-records
//! - The decoded [`Entry`] handed to consumers

use super::error::{PdicError, Result};

/// Size of the fixed header region at the start of the file.
pub const HEADER_SIZE: usize = 256;

/// Unit of the index region size and of block offsets.
pub const BLOCK_UNIT: u64 = 1024;

/// Decoded `dictype` byte of the header.
///
/// - Bit 0x01: binary sub-records may be compressed
/// - Bit 0x08: text fields are BOCU-1 encoded
/// - Bit 0x40: the dictionary is encrypted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DicType {
    pub compressed_binary: bool,
    pub bocu1: bool,
    pub encrypted: bool,
    pub raw: u8,
}

impl DicType {
    pub const COMPRESSED_BINARY: u8 = 0x01;
    pub const BOCU1: u8 = 0x08;
    pub const ENCRYPTED: u8 = 0x40;
}

impl From<u8> for DicType {
    fn from(raw: u8) -> Self {
        Self {
            compressed_binary: raw & Self::COMPRESSED_BINARY != 0,
            bocu1: raw & Self::BOCU1 != 0,
            encrypted: raw & Self::ENCRYPTED != 0,
            raw,
        }
    }
}

/// Width of a little-endian integer field.
///
/// Used both for index block ids (selected by the header) and for field
/// lengths and binary sub-record lengths (selected per block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    U16,
    U32,
}

impl IntWidth {
    /// Returns the byte width of the integer.
    pub fn byte_width(&self) -> usize {
        match self {
            IntWidth::U16 => 2,
            IntWidth::U32 => 4,
        }
    }
}

impl TryFrom<u8> for IntWidth {
    type Error = PdicError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::U16),
            1 => Ok(Self::U32),
            _ => Err(PdicError::InvalidFormat(format!(
                "Unknown index width selector: {}",
                value
            ))),
        }
    }
}

/// Complete parsed header of a PDIC container.
///
/// Immutable once parsed; everything needed to locate the index and data
/// regions is derived from it.
#[derive(Debug, Clone)]
pub struct PdicHeader {
    /// Header name stored in the first 100 bytes.
    pub title: String,
    pub version: u16,
    /// Size of the index region in 1024-byte units.
    pub index_block: u16,
    /// Word count as recorded by the writer. Informational only.
    pub nword: u32,
    pub dictype: DicType,
    /// Width of block ids in the index table.
    pub index_width: IntWidth,
    /// Size of the extended header region in bytes.
    pub extheader: u32,
    /// Number of index entries, one per data block.
    pub nindex2: u32,
    /// Number of blocks in use as recorded by the writer. Informational only.
    pub nblock2: u32,
}

impl PdicHeader {
    /// Major format version (high byte of `version`).
    pub fn major_version(&self) -> u8 {
        (self.version >> 8) as u8
    }

    /// Absolute offset of the index region.
    pub fn index_offset(&self) -> u64 {
        BLOCK_UNIT + u64::from(self.extheader)
    }

    /// Absolute offset of the data region.
    pub fn data_offset(&self) -> u64 {
        self.index_offset() + u64::from(self.index_block) * BLOCK_UNIT
    }

    /// Absolute offset of the data block with the given id.
    pub fn block_offset(&self, block_id: u32) -> u64 {
        self.data_offset() + u64::from(block_id) * BLOCK_UNIT
    }
}

/// The per-record attribute byte.
///
/// - Bits 0x0F: word level (0..=15)
/// - Bit 0x10: an extension chain follows the translation
/// - Bit 0x20: memorization mark
/// - Bit 0x40: modification mark
///
/// The value 0xFF marks a reference-only entry, dropped since PDIC Ver.6.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordFlags(pub u8);

impl WordFlags {
    pub const LEVEL_MASK: u8 = 0x0f;
    pub const EXTENSION: u8 = 0x10;
    pub const MEMORY: u8 = 0x20;
    pub const MODIFY: u8 = 0x40;
    pub const REFERENCE: u8 = 0xff;

    pub fn level(&self) -> u8 {
        self.0 & Self::LEVEL_MASK
    }

    pub fn has_extension(&self) -> bool {
        self.0 != Self::REFERENCE && self.0 & Self::EXTENSION != 0
    }

    pub fn memory(&self) -> bool {
        self.0 & Self::MEMORY != 0
    }

    pub fn modify(&self) -> bool {
        self.0 & Self::MODIFY != 0
    }

    pub fn is_reference(&self) -> bool {
        self.0 == Self::REFERENCE
    }
}

/// The role of an extension sub-record, from the low nibble of its flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtRole {
    Example,
    Pronunciation,
    LinkedFile,
    Reserved(u8),
}

impl From<u8> for ExtRole {
    fn from(flag: u8) -> Self {
        match flag & 0x0f {
            1 => Self::Example,
            2 => Self::Pronunciation,
            4 => Self::LinkedFile,
            other => Self::Reserved(other),
        }
    }
}

impl std::fmt::Display for ExtRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExtRole::Example => write!(f, "example"),
            ExtRole::Pronunciation => write!(f, "pronunciation"),
            ExtRole::LinkedFile => write!(f, "linked file"),
            ExtRole::Reserved(code) => write!(f, "reserved role {:#x}", code),
        }
    }
}

/// One step of the extension chain that follows a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtRecord<'a> {
    /// NUL-terminated BOCU-1 text.
    Text { role: ExtRole, bytes: &'a [u8] },
    /// Length-prefixed binary payload; never decoded.
    Binary {
        role: ExtRole,
        compressed: bool,
        bytes: &'a [u8],
    },
    /// Flag byte with its top bit set.
    EndOfChain,
}

/// Which field of a record a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Headword,
    Translation,
    Example,
    Pronunciation,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FieldKind::Headword => write!(f, "headword"),
            FieldKind::Translation => write!(f, "translation"),
            FieldKind::Example => write!(f, "example"),
            FieldKind::Pronunciation => write!(f, "pronunciation"),
        }
    }
}

/// A single decoded dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Search key: the headword part before a TAB, or the whole headword.
    pub keyword: String,
    /// Display headword: the part after a TAB, or the whole headword.
    pub word: String,
    pub trans: String,
    pub exp: Option<String>,
    pub pron: Option<String>,
    pub level: u8,
    pub memory: bool,
    pub modify: bool,
}
