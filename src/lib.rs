//! # pdic-reader
//!
//! A reader for PDIC Unicode dictionary files (`.dic`, Ver.6 format).
//!
//! Text fields are stored as BOCU-1, which this crate also exposes as a
//! standalone codec in [`bocu1`]. Encrypted dictionaries are rejected;
//! compressed binary and linked-file sub-records are skipped.
//!
//! ```no_run
//! use pdic_reader::PdicReader;
//!
//! let mut reader = PdicReader::open("eijiro.dic")?;
//! for entry in reader.entries() {
//!     let entry = entry?;
//!     println!("{}\t{}", entry.word, entry.trans);
//! }
//! # Ok::<(), pdic_reader::PdicError>(())
//! ```
pub mod export;
pub mod pdic;

// Re-export the main types for convenience
pub use pdic::{
    bocu1,
    models::{DicType, Entry, IntWidth, PdicHeader, WordFlags},
    EntryIterator, PdicError, PdicReader, Result,
};
