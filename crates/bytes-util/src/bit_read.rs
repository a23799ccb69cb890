/// Error returned when a read would run past the end of the buffer.
///
/// The cursor is left where it was; a failed read never consumes bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("attempted to read past the end of the bit buffer")]
pub struct EndOfData;

/// A cursor that reads individual bits from a byte slice.
///
/// Bit 0 of the stream is the most significant bit of the first byte.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute position in bits from the start of `data`.
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new reader positioned at the first bit of `data`.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> Result<bool, EndOfData> {
        if self.remaining_bits() == 0 {
            return Err(EndOfData);
        }

        let byte = self.data[self.pos / 8];
        let bit = (byte >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        Ok(bit == 1)
    }

    /// Reads the next `count` bits as a big-endian unsigned integer.
    ///
    /// `count` must not exceed 64. Fails without advancing if fewer than
    /// `count` bits remain.
    pub fn read_bits(&mut self, count: u32) -> Result<u64, EndOfData> {
        debug_assert!(count <= 64, "cannot read more than 64 bits at once");

        if self.remaining_bits() < count as usize {
            return Err(EndOfData);
        }

        let mut value = 0u64;
        for _ in 0..count {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - (self.pos % 8))) & 1;
            value = (value << 1) | bit as u64;
            self.pos += 1;
        }

        Ok(value)
    }

    /// Advances the cursor by `count` bits without returning their value.
    pub fn seek_bits(&mut self, count: usize) -> Result<(), EndOfData> {
        if self.remaining_bits() < count {
            return Err(EndOfData);
        }

        self.pos += count;
        Ok(())
    }

    /// Advances the cursor to the next byte boundary. No-op when already
    /// aligned.
    pub fn align(&mut self) {
        self.pos = self.pos.next_multiple_of(8).min(self.data.len() * 8);
    }

    /// Returns true if the cursor sits on a byte boundary.
    pub const fn is_aligned(&self) -> bool {
        self.pos % 8 == 0
    }

    /// The absolute cursor position in bits from the start of the buffer.
    pub const fn bit_pos(&self) -> usize {
        self.pos
    }

    /// The number of bits between the cursor and the end of the buffer.
    pub const fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// The underlying byte slice, unaffected by the cursor.
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }
}
