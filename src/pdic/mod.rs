//! Core PDIC reader module

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use codec::bocu1;
pub use iter::EntryIterator;
pub use reader::PdicReader;
pub use types::error::{PdicError, Result};
pub use types::models;
