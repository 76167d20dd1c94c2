use std::io::{ErrorKind, Read};

use super::{Symbol, SymbolFrequency, ALPHABET_SIZE};
use crate::{error::Error, Result};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Occurrence count of every byte value in one input stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    symbol_frequencies: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    fn new() -> Self {
        Self {
            symbol_frequencies: [u64::default(); ALPHABET_SIZE],
        }
    }

    pub fn count<R: Read>(source: R) -> Result<Self> {
        let mut table = Self::new();
        read_in_chunks(source, |chunk| {
            table.increment_symbols(chunk);
            Ok(())
        })?;
        Ok(table)
    }

    fn increment_symbols(&mut self, symbols: &[Symbol]) {
        for &symbol in symbols {
            self.symbol_frequencies[symbol as usize] += 1;
        }
    }

    pub fn frequency(&self, symbol: Symbol) -> u64 {
        self.symbol_frequencies[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.symbol_frequencies.iter().sum()
    }

    pub fn distinct_symbols(&self) -> usize {
        self.symbol_frequencies.iter().filter(|&&f| f > 0).count()
    }

    /// all 256 entries in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = SymbolFrequency> + '_ {
        (0..=Symbol::MAX)
            .zip(self.symbol_frequencies.iter().copied())
            .map(SymbolFrequency::from)
    }
}

/// Feeds the whole source to `consume` chunk by chunk and returns the
/// number of bytes read.
pub(crate) fn read_in_chunks<R: Read>(
    mut source: R,
    mut consume: impl FnMut(&[u8]) -> Result<()>,
) -> Result<u64> {
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let read = match source.read(&mut chunk) {
            Ok(0) => return Ok(total),
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::FailedToReadSource(e)),
        };
        consume(&chunk[..read])?;
        total += read as u64;
    }
}

impl From<&[u8]> for FrequencyTable {
    fn from(value: &[u8]) -> Self {
        let mut table = Self::new();
        table.increment_symbols(value);
        table
    }
}
