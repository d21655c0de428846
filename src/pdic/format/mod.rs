//! File format parsing layer for PDIC dictionary containers.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw file I/O and the high-level [`PdicReader`](crate::pdic::reader::PdicReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the fixed 256-byte header
//! - [`index`]: Reads the block id table that follows the header
//! - [`block`]: Walks field records and extension chains inside data blocks
//! - [`entry`]: Folds decoded fields into output entries
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐ 0
//! │  Header (256)   │ ← header::parse()
//! ├─────────────────┤ 1024
//! │  Ext. header    │   (extheader bytes, skipped)
//! ├─────────────────┤ 1024 + extheader
//! │  Index table    │ ← index::parse()
//! │  (index_block   │
//! │   × 1024)       │
//! ├─────────────────┤
//! │  Data blocks    │ ← block::BlockParser
//! │  (1024-aligned) │
//! └─────────────────┘
//! ```

pub mod block;
pub mod entry;
pub mod header;
pub mod index;
