//! Bit-level cursors over byte buffers.
//!
//! [`BitReader`] walks a borrowed byte slice one bit at a time, MSB first,
//! and [`BitWriter`] assembles a byte buffer from individual bits. Both are
//! meant for variable-length-coded media syntax where values rarely fall on
//! byte boundaries.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod bit_read;
mod bit_write;

pub use bit_read::{BitReader, EndOfData};
pub use bit_write::BitWriter;
