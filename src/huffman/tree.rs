use std::cmp::{Eq, Ord, Ordering, PartialEq, PartialOrd, Reverse};
use std::collections::BinaryHeap;
use std::io::{self, Write};

use super::frequency::FrequencyTable;
use super::{Symbol, SymbolFrequency, SymbolSet, ALPHABET_SIZE};
use crate::binary_stream::{BitReader, BitWriter};
use crate::{error::Error, Result};

const MAX_TREE_DEPTH: usize = ALPHABET_SIZE - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Leaf { symbol: Symbol },
    Inner { left: usize, right: usize },
}

#[derive(Clone, Copy, Debug)]
struct Node {
    frequency: u64,
    index: usize,
    kind: NodeKind,
}

// Leaves are stored first in ascending symbol order and inner nodes follow in
// creation order, so the arena index doubles as the tie-break between nodes
// of equal frequency.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

pub struct HuffmanTree {
    nodes: Vec<Node>,
    root_index: Option<usize>,
    leaf_count: usize,
}

impl HuffmanTree {
    pub fn empty() -> HuffmanTree {
        HuffmanTree {
            nodes: vec![],
            root_index: None,
            leaf_count: 0,
        }
    }

    pub fn new(frequencies: &FrequencyTable, symbol_set: SymbolSet) -> HuffmanTree {
        let leaves = frequencies
            .iter()
            .filter(|sf| symbol_set == SymbolSet::Full || sf.frequency > 0);
        let tree = Self::from_leaves(leaves);
        log::info!(
            "Built huffman tree with {} leaves and {} nodes",
            tree.leaf_count,
            tree.nodes.len()
        );
        if tree.root_is_leaf() {
            log::warn!("Input uses a single symbol, its code word is widened to one bit");
        }
        tree
    }

    fn from_leaves(leaves: impl Iterator<Item = SymbolFrequency>) -> HuffmanTree {
        let mut heap = BinaryHeap::new();
        let mut nodes: Vec<Node> = vec![];

        // create the initial nodeset
        for sf in leaves {
            let node = Node {
                frequency: sf.frequency,
                index: nodes.len(),
                kind: NodeKind::Leaf { symbol: sf.symbol },
            };
            heap.push(Reverse(node));
            nodes.push(node);
        }
        let leaf_count = nodes.len();

        // merge nodes until one is left, the first one popped goes left
        while let (Some(Reverse(t1)), Some(Reverse(t2))) = (heap.pop(), heap.pop()) {
            let node = Node {
                frequency: t1.frequency + t2.frequency,
                index: nodes.len(),
                kind: NodeKind::Inner {
                    left: t1.index,
                    right: t2.index,
                },
            };
            heap.push(Reverse(node));
            nodes.push(node);
        }

        // the loop above pops the root as a lone t1 once it is the last node
        let root_index = nodes.last().map(|node| node.index);
        HuffmanTree {
            nodes,
            root_index,
            leaf_count,
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.root_index.is_none()
    }

    pub fn root_is_leaf(&self) -> bool {
        self.root_index
            .is_some_and(|index| matches!(self.nodes[index].kind, NodeKind::Leaf { .. }))
    }

    pub(crate) fn root_index(&self) -> Option<usize> {
        self.root_index
    }

    pub(crate) fn kind(&self, index: usize) -> NodeKind {
        self.nodes[index].kind
    }

    /// Writes the tree shape in pre-order: `0` for an inner node,
    /// `1` followed by the 8 symbol bits for a leaf.
    pub fn write_shape<T: Write>(&self, writer: &mut BitWriter<T>) -> io::Result<()> {
        let mut node_index_stack: Vec<usize> = self.root_index.into_iter().collect();
        while let Some(index) = node_index_stack.pop() {
            match self.nodes[index].kind {
                NodeKind::Inner { left, right } => {
                    writer.write_bits(&[0x00], 1)?;
                    node_index_stack.push(right);
                    node_index_stack.push(left);
                }
                NodeKind::Leaf { symbol } => {
                    writer.write_bits(&[0xFF], 1)?;
                    writer.write_bits(&[symbol], 8)?;
                }
            }
        }
        Ok(())
    }

    /// Rebuilds a tree written by `write_shape`. Frequencies are not part of
    /// the shape and read back as zero.
    pub fn read_shape(reader: &mut BitReader) -> Result<HuffmanTree> {
        let mut tree = Self::empty();
        let mut seen = [false; ALPHABET_SIZE];
        let root_index = tree.read_node(reader, &mut seen, 0)?;
        tree.root_index = Some(root_index);
        Ok(tree)
    }

    fn read_node(
        &mut self,
        reader: &mut BitReader,
        seen: &mut [bool; ALPHABET_SIZE],
        depth: usize,
    ) -> Result<usize> {
        if depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidTreeShape);
        }
        let is_leaf = reader
            .read_bit()
            .ok_or(Error::TruncatedContainer("tree shape"))?;
        let kind = if is_leaf {
            let symbol = reader
                .read_bits(8)
                .ok_or(Error::TruncatedContainer("tree shape"))?;
            if seen[symbol as usize] {
                return Err(Error::InvalidTreeShape);
            }
            seen[symbol as usize] = true;
            self.leaf_count += 1;
            NodeKind::Leaf { symbol }
        } else {
            let left = self.read_node(reader, seen, depth + 1)?;
            let right = self.read_node(reader, seen, depth + 1)?;
            NodeKind::Inner { left, right }
        };
        let index = self.nodes.len();
        self.nodes.push(Node {
            frequency: 0,
            index,
            kind,
        });
        Ok(index)
    }
}
