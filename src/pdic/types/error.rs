//! Custom error types for the pdic-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every variant is fatal for the decode it occurs in. Per-field text decoding
/// failures never surface here; the block parser recovers from those locally.
#[derive(Debug, Error)]
pub enum PdicError {
    /// An error originating from I/O operations, including short reads of the
    /// header, index or data blocks.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header's major version is not 6.
    #[error("Unsupported PDIC version: {0:#06x}. Only Ver.6 containers are supported.")]
    UnsupportedVersion(u16),

    /// The dictionary-type byte carries the encryption bit.
    #[error("Encrypted dictionaries are not supported.")]
    Encrypted,

    /// A fixed-size region ended before all of its bytes could be read.
    #[error("Truncated {section}: unexpected end of file")]
    Truncated { section: &'static str },

    /// The file is structurally invalid.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// A convenience `Result` type alias using the crate's `PdicError` type.
pub type Result<T> = std::result::Result<T, PdicError>;

impl PdicError {
    /// Maps an unexpected end of file while reading `section` to
    /// [`PdicError::Truncated`], keeping every other I/O error as is.
    pub(crate) fn from_read(section: &'static str) -> impl FnOnce(std::io::Error) -> PdicError {
        move |e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => PdicError::Truncated { section },
            _ => PdicError::Io(e),
        }
    }
}
