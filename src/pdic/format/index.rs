//! # Index Table Parsing
//!
//! The index region follows the header and the optional extended header. It
//! holds one entry per data block:
//!
//! ```text
//! [2 or 4 bytes] block id (little-endian, width from the header)
//! [N bytes]      first headword of the block, NUL terminated
//! ```
//!
//! Only the block ids are needed to walk the data region in order, so the
//! search keys are skipped without decoding.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, info};

use crate::pdic::types::{
    error::{PdicError, Result},
    models::PdicHeader,
};
use crate::pdic::utils;

/// Reads the index table, returning the block ids in index order.
///
/// # Errors
/// Returns [`PdicError::Truncated`] if the file ends before `nindex2` entries
/// have been read.
pub fn parse<R: Read + Seek>(file: &mut R, header: &PdicHeader) -> Result<Vec<u32>> {
    let index_offset = header.index_offset();
    info!(
        "Parsing index table: {} entries at offset {:#x}",
        header.nindex2, index_offset
    );
    file.seek(SeekFrom::Start(index_offset))?;

    // The count comes straight from the file; don't trust it for allocation.
    let mut block_ids = Vec::with_capacity(header.nindex2.min(0x10000) as usize);
    for _ in 0..header.nindex2 {
        let block_id = utils::read_uint(file, header.index_width)
            .map_err(PdicError::from_read("index table"))?;
        let key_len = utils::skip_cstr(file).map_err(PdicError::from_read("index table"))?;
        debug!("Index entry {}: block {} (key {} bytes)", block_ids.len(), block_id, key_len);
        block_ids.push(block_id);
    }

    Ok(block_ids)
}
