//! Builders for synthetic PDIC containers.

#![allow(dead_code)]

use pdic_reader::bocu1;

pub const BOCU1: u8 = 0x08;
pub const ENCRYPTED: u8 = 0x40;

/// Record body: encoded headword suffix, encoded translation, extension bytes.
pub fn body(headword: &[u8], trans: &str, ext: &[u8]) -> Vec<u8> {
    let mut body = headword.to_vec();
    body.push(0);
    body.extend(bocu1::encode(trans));
    body.push(0);
    body.extend_from_slice(ext);
    body
}

/// Text extension sub-record with the given flag byte.
pub fn ext_text(flag: u8, text: &str) -> Vec<u8> {
    let mut ext = vec![flag];
    ext.extend(bocu1::encode(text));
    ext.push(0);
    ext
}

pub struct BlockBuilder {
    wide: bool,
    data: Vec<u8>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            wide: false,
            data: Vec::new(),
        }
    }

    /// 32-bit field lengths.
    pub fn wide() -> Self {
        Self {
            wide: true,
            data: Vec::new(),
        }
    }

    pub fn record(mut self, omit: u8, flags: u8, body: Vec<u8>) -> Self {
        if self.wide {
            self.data.extend((body.len() as u32).to_le_bytes());
        } else {
            self.data.extend((body.len() as u16).to_le_bytes());
        }
        self.data.push(omit);
        self.data.push(flags);
        self.data.extend(body);
        self
    }

    /// Plain entry with no prefix omission and no flags.
    pub fn entry(self, word: &str, trans: &str) -> Self {
        self.record(0, 0, body(&bocu1::encode(word), trans, &[]))
    }

    fn bytes(&self) -> Vec<u8> {
        let units = (2 + self.data.len() + 4).div_ceil(1024) as u16;
        let mut span = units;
        if self.wide {
            span |= 0x8000;
        }
        let mut out = span.to_le_bytes().to_vec();
        out.extend(&self.data);
        out.extend(if self.wide { &[0u8, 0, 0, 0][..] } else { &[0u8, 0][..] });
        out
    }
}

enum Block {
    Records(BlockBuilder),
    Empty,
}

pub struct ContainerBuilder {
    version: u16,
    dictype: u8,
    wide_index: bool,
    extheader: u32,
    title: String,
    blocks: Vec<Block>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            version: 0x0600,
            dictype: BOCU1,
            wide_index: false,
            extheader: 0,
            title: "PDIC Unicode test".to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn dictype(mut self, dictype: u8) -> Self {
        self.dictype = dictype;
        self
    }

    pub fn wide_index(mut self) -> Self {
        self.wide_index = true;
        self
    }

    pub fn extheader(mut self, size: u32) -> Self {
        self.extheader = size;
        self
    }

    pub fn block(mut self, block: BlockBuilder) -> Self {
        self.blocks.push(Block::Records(block));
        self
    }

    pub fn empty_block(mut self) -> Self {
        self.blocks.push(Block::Empty);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Data region, each block padded to whole 1024-byte units.
        let mut data = Vec::new();
        let mut ids = Vec::new();
        for block in &self.blocks {
            ids.push((data.len() / 1024) as u32);
            let bytes = match block {
                Block::Records(b) => b.bytes(),
                Block::Empty => vec![0, 0],
            };
            data.extend(&bytes);
            data.resize(data.len().div_ceil(1024) * 1024, 0);
        }

        let mut index = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            if self.wide_index {
                index.extend(id.to_le_bytes());
            } else {
                index.extend((*id as u16).to_le_bytes());
            }
            index.extend(format!("key{}", i).as_bytes());
            index.push(0);
        }
        let index_block = index.len().div_ceil(1024).max(1);
        index.resize(index_block * 1024, 0);

        let mut header = vec![0u8; 1024];
        header[..self.title.len()].copy_from_slice(self.title.as_bytes());
        header[0x8c..0x8e].copy_from_slice(&self.version.to_le_bytes());
        header[0x94..0x96].copy_from_slice(&(index_block as u16).to_le_bytes());
        header[0xa0..0xa4].copy_from_slice(&0u32.to_le_bytes());
        header[0xa5] = self.dictype;
        header[0xb6] = u8::from(self.wide_index);
        header[0xb8..0xbc].copy_from_slice(&self.extheader.to_le_bytes());
        header[0xc0..0xc4].copy_from_slice(&(ids.len() as u32).to_le_bytes());
        header[0xc4..0xc8].copy_from_slice(&(ids.len() as u32).to_le_bytes());

        let mut file = header;
        file.extend(vec![0xeeu8; self.extheader as usize]);
        file.extend(index);
        file.extend(data);
        file
    }
}
