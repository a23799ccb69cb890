//! Exponential-Golomb encoding and decoding over bit cursors.
//!
//! Implements the `ue(v)` and `se(v)` descriptors shared by H.264 and H.265
//! (ISO/IEC 23008-2 - 9.2) as extension traits on
//! [`strobe_bytes_util::BitReader`] and [`strobe_bytes_util::BitWriter`].
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

use strobe_bytes_util::{BitReader, BitWriter, EndOfData};

/// The longest leading-zero run accepted by [`BitReaderExpGolombExt::read_exp_golomb`].
///
/// A conforming `ue(v)` element never exceeds 32 leading zeros; a longer run
/// means the cursor is not positioned on an Exp-Golomb code at all.
pub const MAX_LEADING_ZEROS: u32 = 32;

/// Error returned when decoding an Exp-Golomb code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpGolombError {
    /// The buffer ended inside the code.
    #[error(transparent)]
    EndOfData(#[from] EndOfData),
    /// The leading-zero run exceeded [`MAX_LEADING_ZEROS`].
    #[error("exp-golomb leading-zero run exceeds {MAX_LEADING_ZEROS} bits")]
    LeadingZerosOverflow,
}

/// Extends [`BitReader`] with Exp-Golomb decoding.
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned Exp-Golomb (`ue(v)`) value.
    ///
    /// Counts a run of `k` zero bits, consumes the terminating one bit, then
    /// reads `k` more bits as `v`; the decoded value is `(1 << k) + v - 1`.
    fn read_exp_golomb(&mut self) -> Result<u64, ExpGolombError>;

    /// Reads a signed Exp-Golomb (`se(v)`) value.
    ///
    /// The unsigned code points `0, 1, 2, 3, 4, ...` map to
    /// `0, 1, -1, 2, -2, ...`.
    fn read_signed_exp_golomb(&mut self) -> Result<i64, ExpGolombError> {
        let ue = self.read_exp_golomb()?;
        Ok(if ue & 1 == 0 {
            -((ue >> 1) as i64)
        } else {
            ((ue + 1) >> 1) as i64
        })
    }
}

impl BitReaderExpGolombExt for BitReader<'_> {
    fn read_exp_golomb(&mut self) -> Result<u64, ExpGolombError> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > MAX_LEADING_ZEROS {
                return Err(ExpGolombError::LeadingZerosOverflow);
            }
        }

        let remainder = self.read_bits(leading_zeros)?;
        Ok((1u64 << leading_zeros) - 1 + remainder)
    }
}

/// Extends [`BitWriter`] with Exp-Golomb encoding.
pub trait BitWriterExpGolombExt {
    /// Writes an unsigned Exp-Golomb (`ue(v)`) value.
    fn write_exp_golomb(&mut self, value: u64);

    /// Writes a signed Exp-Golomb (`se(v)`) value.
    fn write_signed_exp_golomb(&mut self, value: i64) {
        let ue = if value > 0 {
            (value as u64) * 2 - 1
        } else {
            value.unsigned_abs() * 2
        };
        self.write_exp_golomb(ue);
    }
}

impl BitWriterExpGolombExt for BitWriter {
    fn write_exp_golomb(&mut self, value: u64) {
        // code = value + 1, written with as many leading zeros as it has
        // bits past the first.
        let code = value + 1;
        let width = 64 - code.leading_zeros();
        self.write_bits(0, width - 1);
        self.write_bits(code, width);
    }
}
