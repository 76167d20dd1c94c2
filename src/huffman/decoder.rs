use super::tree::{HuffmanTree, NodeKind};
use super::Symbol;
use crate::binary_stream::BitReader;
use crate::{error::Error, Result};

pub struct HuffmanDecoder<'a> {
    tree: &'a HuffmanTree,
}

impl<'a> HuffmanDecoder<'a> {
    pub fn new(tree: &'a HuffmanTree) -> Self {
        Self { tree }
    }

    /// Walks the tree for exactly `bit_count` bits of `payload`; padding
    /// behind the last code word is never looked at.
    pub fn decode(&self, payload: &[u8], bit_count: u64, out: &mut Vec<Symbol>) -> Result<()> {
        let Some(root_index) = self.tree.root_index() else {
            return match bit_count {
                0 => Ok(()),
                _ => Err(Error::InvalidTreeShape),
            };
        };
        let mut reader = BitReader::new(payload);
        let mut current_index = root_index;
        for _ in 0..bit_count {
            let take_right = reader
                .read_bit()
                .ok_or(Error::TruncatedContainer("payload"))?;
            if let NodeKind::Inner { left, right } = self.tree.kind(current_index) {
                current_index = if take_right { right } else { left };
            }
            if let NodeKind::Leaf { symbol } = self.tree.kind(current_index) {
                out.push(symbol);
                current_index = root_index;
            }
        }
        if current_index != root_index {
            return Err(Error::IncompleteCodeWord);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::HuffmanDecoder;
    use crate::error::Error;
    use crate::huffman::{
        code::CodeTable, encoder::HuffmanEncoder, frequency::FrequencyTable, tree::HuffmanTree,
        SymbolSet,
    };

    fn encode(input: &[u8], tree: &HuffmanTree) -> (Vec<u8>, u64) {
        let code_table = CodeTable::new(tree);
        let mut output = Vec::new();
        let mut encoder = HuffmanEncoder::new(&mut output, &code_table);
        encoder.encode(input).unwrap();
        let bits = encoder.finish().unwrap();
        (output, bits)
    }

    #[test]
    fn test_coder_decode() {
        // a:1 b:01 c:00
        let tree = HuffmanTree::new(&FrequencyTable::from(&b"aaaabbc"[..]), SymbolSet::Observed);
        let decoder = HuffmanDecoder::new(&tree);
        let mut out = Vec::new();
        decoder
            .decode(&[0b0100_1010, 0b0100_0000], 10, &mut out)
            .unwrap();
        assert_eq!(out, b"bcabca");
    }

    #[test]
    fn test_decode_restores_encoded_text() {
        let input = b"It was the best of times, it was the worst of times";
        let tree = HuffmanTree::new(&FrequencyTable::from(&input[..]), SymbolSet::Full);
        let (payload, bits) = encode(input, &tree);
        let mut out = Vec::new();
        HuffmanDecoder::new(&tree)
            .decode(&payload, bits, &mut out)
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_lone_symbol_decodes_one_symbol_per_bit() {
        let tree = HuffmanTree::new(&FrequencyTable::from(&b"zzz"[..]), SymbolSet::Observed);
        let mut out = Vec::new();
        HuffmanDecoder::new(&tree)
            .decode(&[0b0000_0000], 3, &mut out)
            .unwrap();
        assert_eq!(out, b"zzz");
    }

    #[test]
    fn test_payload_shorter_than_bit_count_is_rejected() {
        let tree = HuffmanTree::new(&FrequencyTable::from(&b"abc"[..]), SymbolSet::Full);
        let mut out = Vec::new();
        let result = HuffmanDecoder::new(&tree).decode(&[0xFF], 16, &mut out);
        assert!(matches!(result, Err(Error::TruncatedContainer(_))));
    }

    #[test]
    fn test_bit_count_ending_inside_code_word_is_rejected() {
        // a:1 b:01 c:00, a lone leading zero is half a code word
        let tree = HuffmanTree::new(&FrequencyTable::from(&b"aaaabbc"[..]), SymbolSet::Observed);
        let mut out = Vec::new();
        let result = HuffmanDecoder::new(&tree).decode(&[0b1000_0000], 2, &mut out);
        assert!(matches!(result, Err(Error::IncompleteCodeWord)));
    }
}
