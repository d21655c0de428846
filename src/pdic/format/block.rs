//! # Data Block Parsing
//!
//! Each index entry points at one data block. A block is a run of field
//! records, one per dictionary entry, terminated by a zero field length.
//!
//! ```text
//! Block:
//! [u16]          span word: bit 0x8000 = 32-bit field lengths, 0 = empty block
//! FieldRecord*
//! [u16 | u32]    0 (terminator)
//!
//! FieldRecord:
//! [u16 | u32]    field length (bytes in the body)
//! [u8]           omit length (raw prefix bytes shared with previous headword)
//! [u8]           word flags
//! body:
//!   headword suffix, NUL terminated (BOCU-1)
//!   translation, NUL terminated (BOCU-1)
//!   extension chain (when the flags say so)
//!
//! Extension sub-record:
//! [u8]           flag: 0x80 = end of chain, 0x10 = binary, 0x40 = compressed,
//!                low nibble = role (1 example, 2 pronunciation, 4 linked file)
//! text:   payload, NUL terminated (BOCU-1)
//! binary: [u16 | u32] length, then payload
//! ```
//!
//! The whole body of a record is read before it is interpreted, so the file
//! cursor always lands on the next record no matter what the body contains.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace, warn};

use crate::pdic::codec::bocu1;
use crate::pdic::format::entry::{assemble_entry, RawFields};
use crate::pdic::types::{
    error::{PdicError, Result},
    models::{Entry, ExtRecord, ExtRole, FieldKind, IntWidth, PdicHeader, WordFlags},
};
use crate::pdic::utils;

const SPAN_WIDE_FIELDS: u16 = 0x8000;
const SPAN_MASK: u16 = 0x7fff;

const EXT_END: u8 = 0x80;
const EXT_COMPRESSED: u8 = 0x40;
const EXT_BINARY: u8 = 0x10;

/// One field record as stored in a block, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub omit: u8,
    pub flags: WordFlags,
    pub body: Vec<u8>,
}

/// Streaming parser for the field records of one data block.
///
/// Holds the prefix-compression state for the block; it reads from whatever
/// stream is passed to [`BlockParser::next_entry`], which must stay positioned
/// where the previous call left it.
#[derive(Debug)]
pub struct BlockParser {
    block_id: u32,
    field_width: IntWidth,
    /// Legacy span in 1024-byte units. Kept for diagnostics only.
    span: u16,
    prev_headword: Vec<u8>,
    record_index: usize,
    finished: bool,
}

impl BlockParser {
    /// Seeks to a block and reads its span word.
    ///
    /// Returns `None` for an empty block.
    pub fn open<R: Read + Seek>(
        file: &mut R,
        header: &PdicHeader,
        block_id: u32,
    ) -> Result<Option<Self>> {
        let offset = header.block_offset(block_id);
        file.seek(SeekFrom::Start(offset))?;
        let span_word = file
            .read_u16::<LittleEndian>()
            .map_err(PdicError::from_read("data block"))?;

        if span_word == 0 {
            debug!("Block {} at {:#x} is empty", block_id, offset);
            return Ok(None);
        }

        let field_width = if span_word & SPAN_WIDE_FIELDS != 0 {
            IntWidth::U32
        } else {
            IntWidth::U16
        };
        let span = span_word & SPAN_MASK;
        trace!(
            "Block {} at {:#x}: span={} field width={}-bit",
            block_id,
            offset,
            span,
            field_width.byte_width() * 8
        );

        Ok(Some(Self {
            block_id,
            field_width,
            span,
            prev_headword: Vec::new(),
            record_index: 0,
            finished: false,
        }))
    }

    pub fn block_id(&self) -> u32 {
        self.block_id
    }

    pub fn field_width(&self) -> IntWidth {
        self.field_width
    }

    pub fn span(&self) -> u16 {
        self.span
    }

    /// Reads and decodes the next entry of the block.
    ///
    /// Reference-only records are consumed and skipped. Returns `None` once the
    /// terminating zero field length has been read.
    pub fn next_entry<R: Read>(&mut self, file: &mut R) -> Result<Option<Entry>> {
        while !self.finished {
            let Some(record) = read_record(file, self.field_width)? else {
                self.finished = true;
                trace!("Block {}: {} records", self.block_id, self.record_index);
                break;
            };
            let index = self.record_index;
            self.record_index += 1;

            if let Some(entry) = self.decode_record(&record, index)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Decodes one record. Returns `None` for a reference-only record.
    pub fn decode_record(&mut self, record: &RawRecord, index: usize) -> Result<Option<Entry>> {
        let mut body = record.body.as_slice();
        let suffix = utils::take_cstr(&mut body);
        let headword_raw = self.expand_headword(record.omit, suffix, index)?;

        if record.flags.is_reference() {
            debug!("Block {}, record {}: reference-only entry skipped", self.block_id, index);
            return Ok(None);
        }

        let ctx = RecordContext {
            block_id: self.block_id,
            index,
        };
        let mut fields = RawFields {
            headword: decode_field(&headword_raw, FieldKind::Headword, &ctx).unwrap_or_default(),
            ..Default::default()
        };
        fields.trans = decode_field(utils::take_cstr(&mut body), FieldKind::Translation, &ctx)
            .unwrap_or_default();

        if record.flags.has_extension() {
            walk_extensions(&mut body, self.field_width, &mut fields, &ctx)?;
        } else if !body.is_empty() {
            debug!(
                "Block {}, record {}: {} trailing bytes without extension flag ignored",
                self.block_id,
                index,
                body.len()
            );
        }

        Ok(Some(assemble_entry(fields, record.flags)))
    }

    /// Rebuilds a raw headword from the shared prefix and its own suffix and
    /// remembers it for the next record.
    fn expand_headword(&mut self, omit: u8, suffix: &[u8], index: usize) -> Result<Vec<u8>> {
        let omit = usize::from(omit);
        if omit > self.prev_headword.len() {
            return Err(PdicError::InvalidFormat(format!(
                "Block {}, record {}: omit length {} exceeds previous headword length {}",
                self.block_id,
                index,
                omit,
                self.prev_headword.len()
            )));
        }
        self.prev_headword.truncate(omit);
        self.prev_headword.extend_from_slice(suffix);
        Ok(self.prev_headword.clone())
    }
}

/// Reads one field record. Returns `None` at the zero-length terminator.
pub fn read_record<R: Read>(file: &mut R, field_width: IntWidth) -> Result<Option<RawRecord>> {
    let field_len =
        utils::read_uint(file, field_width).map_err(PdicError::from_read("field record"))?;
    if field_len == 0 {
        return Ok(None);
    }

    let omit = file.read_u8().map_err(PdicError::from_read("field record"))?;
    let flags = WordFlags(file.read_u8().map_err(PdicError::from_read("field record"))?);
    let mut body = vec![0u8; field_len as usize];
    file.read_exact(&mut body)
        .map_err(PdicError::from_read("field record"))?;

    Ok(Some(RawRecord { omit, flags, body }))
}

/// Identifies a record in diagnostics.
#[derive(Debug, Clone, Copy)]
struct RecordContext {
    block_id: u32,
    index: usize,
}

/// Decodes one text field, logging and returning `None` on failure.
fn decode_field(bytes: &[u8], field: FieldKind, ctx: &RecordContext) -> Option<String> {
    match bocu1::decode(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                "Block {}, record {}: failed to decode {}: {} (bytes: {})",
                ctx.block_id,
                ctx.index,
                field,
                e,
                hex::encode(bytes)
            );
            None
        }
    }
}

/// Splits one extension sub-record off the front of `body`.
///
/// Returns `None` when the body is exhausted without an end-of-chain byte.
pub fn next_ext_record<'a>(
    body: &mut &'a [u8],
    field_width: IntWidth,
) -> Result<Option<ExtRecord<'a>>> {
    let Some((&flag, rest)) = body.split_first() else {
        return Ok(None);
    };
    *body = rest;

    if flag & EXT_END != 0 {
        return Ok(Some(ExtRecord::EndOfChain));
    }

    let role = ExtRole::from(flag);
    if flag & EXT_BINARY != 0 {
        let len = utils::read_uint(body, field_width).map_err(|_| {
            PdicError::InvalidFormat("Binary sub-record length runs past the field".to_string())
        })? as usize;
        if len > body.len() {
            return Err(PdicError::InvalidFormat(format!(
                "Binary sub-record of {} bytes overruns the {} remaining field bytes",
                len,
                body.len()
            )));
        }
        let (bytes, rest) = body.split_at(len);
        *body = rest;
        return Ok(Some(ExtRecord::Binary {
            role,
            compressed: flag & EXT_COMPRESSED != 0,
            bytes,
        }));
    }

    Ok(Some(ExtRecord::Text {
        role,
        bytes: utils::take_cstr(body),
    }))
}

/// What to do with one extension sub-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtAction<'a> {
    Decode(FieldKind, &'a [u8]),
    Skip(String),
    Stop,
}

/// Routes a sub-record to the entry field it fills.
pub fn dispatch(record: ExtRecord<'_>) -> ExtAction<'_> {
    match record {
        ExtRecord::EndOfChain => ExtAction::Stop,
        ExtRecord::Text {
            role: ExtRole::Example,
            bytes,
        } => ExtAction::Decode(FieldKind::Example, bytes),
        ExtRecord::Text {
            role: ExtRole::Pronunciation,
            bytes,
        } => ExtAction::Decode(FieldKind::Pronunciation, bytes),
        ExtRecord::Text {
            role: ExtRole::LinkedFile,
            ..
        } => ExtAction::Skip("linked file sub-record is not supported".to_string()),
        ExtRecord::Text { role, .. } => ExtAction::Skip(format!("{} ignored", role)),
        ExtRecord::Binary {
            role,
            compressed,
            bytes,
        } => ExtAction::Skip(format!(
            "{}binary {} sub-record of {} bytes is not supported",
            if compressed { "compressed " } else { "" },
            role,
            bytes.len()
        )),
    }
}

fn walk_extensions(
    body: &mut &[u8],
    field_width: IntWidth,
    fields: &mut RawFields,
    ctx: &RecordContext,
) -> Result<()> {
    while let Some(record) = next_ext_record(body, field_width)? {
        match dispatch(record) {
            ExtAction::Stop => return Ok(()),
            ExtAction::Decode(kind, bytes) => {
                let text = decode_field(bytes, kind, ctx);
                match kind {
                    FieldKind::Example => fields.exp = text.or(fields.exp.take()),
                    FieldKind::Pronunciation => fields.pron = text.or(fields.pron.take()),
                    FieldKind::Headword | FieldKind::Translation => {}
                }
            }
            ExtAction::Skip(notice) => {
                info!("Block {}, record {}: {}", ctx.block_id, ctx.index, notice);
            }
        }
    }
    debug!(
        "Block {}, record {}: extension chain ended without terminator",
        ctx.block_id, ctx.index
    );
    Ok(())
}

/// Reads every entry of one block.
pub fn read_block<R: Read + Seek>(
    file: &mut R,
    header: &PdicHeader,
    block_id: u32,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    if let Some(mut parser) = BlockParser::open(file, header, block_id)? {
        while let Some(entry) = parser.next_entry(file)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}
