//! RBSP unescaping and framing predicates.
//!
//! ISO/IEC 23008-2 - 7.3.1.1 and 7.4.2.

use strobe_bytes_util::{BitReader, EndOfData};

/// Converts an EBSP payload into its RBSP by dropping emulation prevention
/// bytes.
///
/// Every `0x03` that immediately follows two consecutive `0x00` bytes is
/// removed; all other bytes pass through unchanged.
pub fn unescape_rbsp(data: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(data.len());

    let mut i = 0;
    while i < data.len() {
        if i + 2 < data.len() && data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x03 {
            rbsp.push(0x00);
            rbsp.push(0x00);
            i += 3; // Skip the emulation prevention byte.
        } else {
            rbsp.push(data[i]);
            i += 1;
        }
    }

    rbsp
}

/// Returns true if syntax data remains between the cursor and the
/// `rbsp_stop_one_bit`.
///
/// The stop bit is the last set bit in the buffer; anything before it is
/// data, anything after it is padding.
pub fn more_rbsp_data(reader: &BitReader<'_>) -> bool {
    let data = reader.data();

    let Some(last_nonzero) = data.iter().rposition(|&b| b != 0) else {
        return false;
    };
    let stop_bit_pos = last_nonzero * 8 + 7 - data[last_nonzero].trailing_zeros() as usize;

    reader.bit_pos() < stop_bit_pos
}

/// Consumes `rbsp_trailing_bits()`: the stop bit and the zero padding up to
/// the next byte boundary.
///
/// The pattern is consumed, not validated.
pub fn rbsp_trailing_bits(reader: &mut BitReader<'_>) -> Result<(), EndOfData> {
    reader.read_bit()?; // rbsp_stop_one_bit
    reader.align();
    Ok(())
}
