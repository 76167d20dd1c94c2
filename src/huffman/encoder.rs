use std::io::Write;

use super::code::CodeTable;
use super::Symbol;
use crate::binary_stream::BitWriter;
use crate::{error::Error, Result};

/// Replaces every symbol with its code word and packs the bits MSB first.
pub struct HuffmanEncoder<'a, T: Write> {
    writer: BitWriter<'a, T>,
    code_table: &'a CodeTable,
}

impl<'a, T: Write> HuffmanEncoder<'a, T> {
    pub fn new(output: &'a mut T, code_table: &'a CodeTable) -> Self {
        HuffmanEncoder {
            writer: BitWriter::new(output),
            code_table,
        }
    }

    pub fn encode(&mut self, symbols: &[Symbol]) -> Result<()> {
        for &symbol in symbols {
            let code = self
                .code_table
                .get(symbol)
                .ok_or(Error::SymbolNotPresentInCodeTable(symbol))?;
            self.writer
                .write_bits(code.bit_pattern(), code.len())
                .map_err(Error::FailedToWriteBits)?;
        }
        Ok(())
    }

    /// Pads the last byte with zeros and returns the bit count before padding.
    pub fn finish(self) -> Result<u64> {
        self.writer.finish().map_err(Error::FailedToWriteBits)
    }
}
