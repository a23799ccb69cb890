/// Assembles a byte buffer from individual bits, MSB first.
///
/// Writes are infallible; [`BitWriter::finish`] pads the final partial byte
/// with zero bits.
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    pending: u8,
    pending_bits: u8,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.pending = (self.pending << 1) | bit as u8;
        self.pending_bits += 1;

        if self.pending_bits == 8 {
            self.data.push(self.pending);
            self.pending = 0;
            self.pending_bits = 0;
        }
    }

    /// Appends the low `count` bits of `value`, most significant first.
    ///
    /// `count` must not exceed 64.
    pub fn write_bits(&mut self, value: u64, count: u32) {
        debug_assert!(count <= 64, "cannot write more than 64 bits at once");

        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// The number of bits written so far.
    pub fn bit_pos(&self) -> usize {
        self.data.len() * 8 + self.pending_bits as usize
    }

    /// Pads the final partial byte with zero bits and returns the buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending_bits > 0 {
            self.data.push(self.pending << (8 - self.pending_bits));
        }

        self.data
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn write_bits_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b0_1100_0101_0, 10);
        writer.write_bits(0b011, 3);

        assert_eq!(writer.finish(), vec![0b1010_1100, 0b0101_0011]);
    }

    #[test]
    fn finish_pads_with_zeros() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);

        assert_eq!(writer.bit_pos(), 3);
        assert_eq!(writer.finish(), vec![0b1010_0000]);
    }

    #[test]
    fn round_trip_with_reader() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x3ff, 10);
        writer.write_bits(0, 7);
        writer.write_bits(0xdead_beef, 32);
        let bytes = writer.finish();

        let mut reader = crate::BitReader::new(&bytes);
        assert_eq!(reader.read_bits(10).unwrap(), 0x3ff);
        assert_eq!(reader.read_bits(7).unwrap(), 0);
        assert_eq!(reader.read_bits(32).unwrap(), 0xdead_beef);
    }
}
