//! Sequential access to PDIC dictionary entries.
//!
//! # Example
//! ```no_run
//! # use pdic_reader::PdicReader;
//! let mut reader = PdicReader::open("dict.dic").unwrap();
//! for result in reader.entries() {
//!     let entry = result.unwrap();
//!     println!("{}: {}", entry.word, entry.trans);
//! }
//! ```

use std::io::{Read, Seek};
use std::iter::FusedIterator;

use super::format::block::BlockParser;
use super::reader::PdicReader;
use super::types::error::Result;
use super::types::models::Entry;

/// Iterator over decoded entries, in block order and record order.
///
/// Decodes one record per call to `next`; only the current block's prefix
/// state is kept in memory.
///
/// Created by [`PdicReader::entries()`](crate::PdicReader::entries).
pub struct EntryIterator<'a, R> {
    reader: &'a mut PdicReader<R>,
    block_idx: usize,
    current_block: Option<BlockParser>,
    done: bool,
}

impl<'a, R: Read + Seek> EntryIterator<'a, R> {
    pub(super) fn new(reader: &'a mut PdicReader<R>) -> Self {
        Self {
            reader,
            block_idx: 0,
            current_block: None,
            done: false,
        }
    }

    fn advance(&mut self) -> Result<Option<Entry>> {
        loop {
            // Try to get next entry from the current block
            if let Some(parser) = self.current_block.as_mut() {
                if let Some(entry) = self.reader.next_in_block(parser)? {
                    return Ok(Some(entry));
                }
                self.current_block = None;
            }

            // Check if all blocks have been processed
            if self.block_idx >= self.reader.num_blocks() {
                return Ok(None);
            }

            // Empty blocks yield no parser; the loop moves on to the next one
            self.current_block = self.reader.open_block(self.block_idx)?;
            self.block_idx += 1;
        }
    }
}

impl<R: Read + Seek> Iterator for EntryIterator<'_, R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> FusedIterator for EntryIterator<'_, R> {}
