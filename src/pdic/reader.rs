use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::info;

use super::format;
use super::format::block::BlockParser;
use super::iter::EntryIterator;
use super::types::error::{PdicError, Result};
use super::types::models::{Entry, PdicHeader};

/// The main reader for PDIC dictionary containers.
///
/// Opening a reader parses the header and the index table, so every fatal
/// condition (unsupported version, encryption, truncated header or index) is
/// reported before a single entry is decoded. Entries are then decoded lazily,
/// one record at a time, in file order.
///
/// The reader owns the only cursor into the underlying source.
#[derive(Debug)]
pub struct PdicReader<R = BufReader<File>> {
    file: R,
    header: PdicHeader,
    block_ids: Vec<u32>,
}

impl PdicReader<BufReader<File>> {
    /// Opens a PDIC file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - Header or index table is truncated
    /// - Major version is not 6
    /// - The dictionary is encrypted
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening PDIC file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PdicReader<R> {
    /// Parses a container from any seekable source, such as an in-memory
    /// `Cursor`.
    pub fn from_reader(mut file: R) -> Result<Self> {
        file.seek(SeekFrom::Start(0))?;
        let header = format::header::parse(&mut file)?;
        let block_ids = format::index::parse(&mut file, &header)?;

        info!(
            "PDIC file opened: {} blocks, data region at {:#x}",
            block_ids.len(),
            header.data_offset()
        );

        Ok(Self {
            file,
            header,
            block_ids,
        })
    }

    pub fn header(&self) -> &PdicHeader {
        &self.header
    }

    /// Block ids in index order.
    pub fn block_ids(&self) -> &[u32] {
        &self.block_ids
    }

    /// Returns the number of data blocks listed in the index.
    pub fn num_blocks(&self) -> usize {
        self.block_ids.len()
    }

    /// Returns an iterator over all entries in file order.
    ///
    /// The iterator yields `Result<Entry>`. A structural error inside a data
    /// block is yielded once and ends the iteration; per-field text decoding
    /// failures are logged and never end it.
    pub fn entries(&mut self) -> EntryIterator<'_, R> {
        EntryIterator::new(self)
    }

    /// Decodes every entry of the block at `block_index` in the index table.
    ///
    /// Random-access counterpart of [`entries`](Self::entries).
    pub fn read_block(&mut self, block_index: usize) -> Result<Vec<Entry>> {
        let block_id = *self.block_ids.get(block_index).ok_or_else(|| {
            PdicError::InvalidFormat(format!("Invalid block index: {}", block_index))
        })?;
        format::block::read_block(&mut self.file, &self.header, block_id)
    }

    /// Convenience method: decode every entry.
    ///
    /// **Warning: Memory intensive!** Prefer [`entries`](Self::entries) for
    /// large dictionaries.
    pub fn collect_entries(&mut self) -> Result<Vec<Entry>> {
        self.entries().collect()
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.file
    }

    pub(crate) fn open_block(&mut self, block_index: usize) -> Result<Option<BlockParser>> {
        let block_id = self.block_ids[block_index];
        BlockParser::open(&mut self.file, &self.header, block_id)
    }

    pub(crate) fn next_in_block(&mut self, parser: &mut BlockParser) -> Result<Option<Entry>> {
        parser.next_entry(&mut self.file)
    }
}
