use std::io;
use std::io::Write;

/// State for writing individual bits to a Writer
pub struct BitWriter<'a, T: Write> {
    /// the underlying output stream
    writer: &'a mut T,
    /// buffer of individual bits not yet written
    buffer: u8,
    /// how many bits are waiting to be written
    buffer_space_used: u8,
    /// every bit accepted so far, padding excluded
    bits_written: u64,
}

impl<'a, T: Write> BitWriter<'a, T> {
    pub fn new(writer: &'a mut T) -> BitWriter<'a, T> {
        BitWriter {
            writer,
            buffer: 0,
            buffer_space_used: 0,
            bits_written: 0,
        }
    }

    /// write a non-byte-aligned number of bits
    ///
    /// buf: a byte array containing a contigous block, MSB first
    /// count: how many bits of buf to write
    ///
    /// Complete bytes are passed on to the underlying stream right away,
    /// the remainder waits in the buffer until `finish` is called.
    pub fn write_bits(&mut self, buf: &[u8], count: usize) -> io::Result<()> {
        let mut remaining_bits_offset = 0;
        if self.buffer_space_used == 0 {
            // this is efficient for large blocks of byte writes
            let quick_byte_count = count / 8;
            self.writer.write_all(&buf[0..quick_byte_count])?;
            remaining_bits_offset = quick_byte_count * 8;
        }
        for bit_index in remaining_bits_offset..count {
            let byte_index = bit_index / 8;
            let bit_index = bit_index % 8;
            let bit_val: bool = (buf[byte_index] & (0b10000000_u8 >> bit_index)) > 0;
            self.push_bit(bit_val)?;
        }
        self.bits_written += count as u64;
        Ok(())
    }

    fn push_bit(&mut self, bit_val: bool) -> io::Result<()> {
        if bit_val {
            self.buffer |= 0b10000000_u8 >> self.buffer_space_used;
        }
        self.buffer_space_used += 1;
        if self.buffer_space_used == 8 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer_space_used = 0;
            self.buffer = 0; // depended upon in finish()
        }
        Ok(())
    }

    #[cfg(test)]
    fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Writes the pending bits, zero padded on the right to the next
    /// byte boundary, and returns the number of bits written before padding.
    pub fn finish(self) -> io::Result<u64> {
        if self.buffer_space_used != 0 {
            self.writer.write_all(&[self.buffer])?;
        }
        self.writer.flush()?;
        Ok(self.bits_written)
    }
}

/// Reads single bits, MSB first, from a byte slice
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = self.bytes.get(self.position / 8)?;
        let bit_val = byte & (0b10000000_u8 >> (self.position % 8)) > 0;
        self.position += 1;
        Some(bit_val)
    }

    /// reads up to 8 bits into the low end of a byte
    pub fn read_bits(&mut self, count: u8) -> Option<u8> {
        debug_assert!(count <= 8);
        let mut value = 0u8;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u8;
        }
        Some(value)
    }

    /// bytes touched so far, a partially read byte included
    pub fn bytes_consumed(&self) -> usize {
        self.position.div_ceil(8)
    }
}

#[cfg(test)]
mod test {
    use super::{BitReader, BitWriter};

    #[test]
    fn byte_mode_test() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        let input: &[u8] = &[72, 65, 76, 76, 79];
        writer.write_bits(input, 40).expect("should not fail");
        let bits = writer.finish().expect("finishing should not fail");
        assert_eq!(bits, 40);
        assert_eq!(my_output, vec![72, 65, 76, 76, 79]);
    }

    #[test]
    fn bit_mode_test() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        // write 0b11000011 0b1111 (in MSb notation)
        writer.write_bits(&[0xFF], 2).expect("ERR");
        writer.write_bits(&[0x00], 4).expect("ERR");
        writer.write_bits(&[0xFF], 2).expect("ERR");
        writer.write_bits(&[0xFF], 4).expect("ERR");
        assert_eq!(writer.bits_written(), 12);
        writer.finish().expect("ERR");
        assert_eq!(my_output.len(), 2);
        assert_eq!(my_output[0], 195);
        assert_eq!(my_output[1], 15 << 4);
    }

    #[test]
    fn mixed_mode_test() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        // 0b111
        writer.write_bits(&[0xFF], 3).expect("ERR");
        // 0b11100000 00100000 01010000 100
        writer.write_bits(&[1, 2, 4 | 128], 24).expect("ERR");
        writer.finish().expect("ERR");
        assert_eq!(my_output, vec![224, 32, 80, 128]);
    }

    #[test]
    fn nothing_written_emits_nothing() {
        let mut my_output: Vec<u8> = vec![];
        let writer = BitWriter::new(&mut my_output);
        assert_eq!(writer.finish().expect("ERR"), 0);
        assert!(my_output.is_empty());
    }

    #[test]
    fn reader_follows_writer_bit_order() {
        let bytes = [0b1010_0000u8, 0b1100_0001];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bit(), Some(true));
        assert_eq!(reader.read_bit(), Some(false));
        assert_eq!(reader.bytes_consumed(), 1);
        assert_eq!(reader.read_bits(8), Some(0b1000_0011));
        assert_eq!(reader.bytes_consumed(), 2);
        assert_eq!(reader.read_bits(6), Some(0b00_0001));
        assert_eq!(reader.read_bit(), None);
    }
}
