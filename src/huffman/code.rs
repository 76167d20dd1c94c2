use std::fmt;

use super::tree::{HuffmanTree, NodeKind};
use super::{Symbol, ALPHABET_SIZE};

/// Bits of one code word, packed MSB first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeWord {
    bit_pattern: Vec<u8>,
    length: usize,
}

impl CodeWord {
    fn push(&self, val: bool) -> CodeWord {
        let mut res = self.clone();
        if res.length % 8 == 0 {
            res.bit_pattern.push(0);
        }
        if val {
            res.bit_pattern[res.length / 8] |= 0b10000000 >> (res.length % 8);
        }
        res.length += 1;
        res
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn bit_pattern(&self) -> &[u8] {
        &self.bit_pattern
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(|i| self.bit_pattern[i / 8] & (0b10000000 >> (i % 8)) > 0)
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Code word of every symbol that is a leaf of the tree.
pub struct CodeTable {
    code_word_lookup_table: [Option<CodeWord>; ALPHABET_SIZE],
}

impl CodeTable {
    pub fn new(tree: &HuffmanTree) -> CodeTable {
        let mut table = CodeTable {
            code_word_lookup_table: [const { None }; ALPHABET_SIZE],
        };
        let Some(root_index) = tree.root_index() else {
            return table;
        };
        // a lone leaf would get the empty code word, give it a single bit instead
        let root_code = if tree.root_is_leaf() {
            CodeWord::default().push(false)
        } else {
            CodeWord::default()
        };
        let mut node_index_stack = vec![(root_index, root_code)];
        while let Some((index, current_pattern)) = node_index_stack.pop() {
            match tree.kind(index) {
                NodeKind::Leaf { symbol } => {
                    table.code_word_lookup_table[symbol as usize] = Some(current_pattern);
                }
                NodeKind::Inner { left, right } => {
                    node_index_stack.push((right, current_pattern.push(true)));
                    node_index_stack.push((left, current_pattern.push(false)));
                }
            }
        }
        table
    }

    pub fn get(&self, symbol: Symbol) -> Option<&CodeWord> {
        self.code_word_lookup_table[symbol as usize].as_ref()
    }

    pub fn len(&self) -> usize {
        self.code_word_lookup_table
            .iter()
            .filter(|c| c.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &CodeWord)> + '_ {
        (0..=Symbol::MAX)
            .zip(self.code_word_lookup_table.iter())
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol, code)))
    }
}
