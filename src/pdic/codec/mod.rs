//! Codec layer for text fields.
//!
//! Every text field in a PDIC Unicode container (headwords, translations,
//! examples, pronunciations) is stored as BOCU-1.
//!
//! # Submodules
//!
//! - [`bocu1`][]: the order-preserving differential Unicode codec

pub mod bocu1;

pub use bocu1::{Bocu1Error, Bocu1State};
