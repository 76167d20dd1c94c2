use std::io::Read;

use crate::container::{self, Format};
use crate::huffman::{
    code::CodeTable, decoder::HuffmanDecoder, encoder::HuffmanEncoder,
    frequency::{read_in_chunks, FrequencyTable},
    tree::HuffmanTree,
    SymbolSet,
};
use crate::{error::Error, logger, Arguments, Result};

/// Options of the two pass compression pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Compressor {
    pub symbol_set: SymbolSet,
    pub format: Format,
}

impl From<&Arguments> for Compressor {
    fn from(value: &Arguments) -> Self {
        Self {
            symbol_set: value.symbol_set,
            format: value.format,
        }
    }
}

pub struct EncodedArtifact {
    pub input_size: u64,
    /// payload bits before padding
    pub bit_count: u64,
    pub bytes: Vec<u8>,
}

impl Compressor {
    pub fn new(symbol_set: SymbolSet, format: Format) -> Self {
        Self { symbol_set, format }
    }

    /// Runs the pipeline over a source that `open_source` opens twice, once
    /// for counting and once for packing. Nothing is returned unless both
    /// passes saw the same number of bytes.
    pub fn compress<R, F>(&self, mut open_source: F) -> Result<EncodedArtifact>
    where
        R: Read,
        F: FnMut() -> Result<R>,
    {
        let frequencies = FrequencyTable::count(open_source()?)?;
        log::info!(
            "Counted {} input bytes over {} distinct symbols",
            frequencies.total(),
            frequencies.distinct_symbols()
        );
        let tree = HuffmanTree::new(&frequencies, self.symbol_set);
        let code_table = CodeTable::new(&tree);
        logger::log_code_table(&code_table);

        let mut payload: Vec<u8> = Vec::new();
        let mut encoder = HuffmanEncoder::new(&mut payload, &code_table);
        let packed = read_in_chunks(open_source()?, |chunk| encoder.encode(chunk))?;
        let bit_count = encoder.finish()?;
        if packed != frequencies.total() {
            return Err(Error::SourceChangedBetweenPasses {
                expected: frequencies.total(),
                actual: packed,
            });
        }
        log::info!("Packed {} bits into {} bytes", bit_count, payload.len());

        let bytes = match self.format {
            Format::Raw => payload,
            Format::Framed => {
                let mut framed = Vec::new();
                container::write_framed(&mut framed, &tree, packed, bit_count, &payload)?;
                framed
            }
        };
        Ok(EncodedArtifact {
            input_size: packed,
            bit_count,
            bytes,
        })
    }

    #[cfg(test)]
    pub(crate) fn compress_bytes(&self, input: &[u8]) -> Result<EncodedArtifact> {
        self.compress(|| Ok(input))
    }

    /// Restores the input of a framed artifact. Raw artifacts carry no
    /// code table and are rejected by the magic check.
    pub fn decompress(artifact: &[u8]) -> Result<Vec<u8>> {
        let framed = container::parse_framed(artifact)?;
        let mut restored = Vec::new();
        HuffmanDecoder::new(&framed.tree).decode(framed.payload, framed.bit_count, &mut restored)?;
        if restored.len() as u64 != framed.original_size {
            return Err(Error::DecodedLengthMismatch {
                expected: framed.original_size,
                actual: restored.len() as u64,
            });
        }
        log::info!(
            "Restored {} bytes from {} payload bits",
            restored.len(),
            framed.bit_count
        );
        Ok(restored)
    }
}
