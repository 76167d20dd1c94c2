use clap::{builder::PossibleValue, ValueEnum};

use crate::binary_stream::{BitReader, BitWriter};
use crate::huffman::tree::HuffmanTree;
use crate::{error::Error, Result};

pub const MAGIC: &[u8; 4] = b"HUFF";
pub const VERSION: u8 = 1;

/// magic, version, original size, bit count, shape length
const HEADER_LENGTH: usize = 4 + 1 + 8 + 8 + 2;

/// Layout of the compressed artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// packed code words only, no way back without the code table
    #[default]
    Raw,
    /// header and tree shape in front of the packed code words
    Framed,
}

impl ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Raw, Self::Framed]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Raw => Some(PossibleValue::new("Raw")),
            Self::Framed => Some(PossibleValue::new("Framed")),
        }
    }
}

pub struct FramedArtifact<'a> {
    pub original_size: u64,
    pub bit_count: u64,
    pub tree: HuffmanTree,
    pub payload: &'a [u8],
}

pub fn write_framed(
    output: &mut Vec<u8>,
    tree: &HuffmanTree,
    original_size: u64,
    bit_count: u64,
    payload: &[u8],
) -> Result<()> {
    let mut shape: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut shape);
    tree.write_shape(&mut writer)
        .map_err(Error::FailedToWriteBits)?;
    writer.finish().map_err(Error::FailedToWriteBits)?;
    // 256 leaves and 255 inner nodes need 2559 bits at most
    let shape_length = shape.len() as u16;

    output.reserve(HEADER_LENGTH + shape.len() + payload.len());
    output.extend_from_slice(MAGIC);
    output.push(VERSION);
    output.extend_from_slice(&original_size.to_be_bytes());
    output.extend_from_slice(&bit_count.to_be_bytes());
    output.extend_from_slice(&shape_length.to_be_bytes());
    output.extend_from_slice(&shape);
    output.extend_from_slice(payload);
    log::debug!(
        "Framed artifact: {} header bytes, {} shape bytes, {} payload bytes",
        HEADER_LENGTH,
        shape.len(),
        payload.len()
    );
    Ok(())
}

struct ByteCursor<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    fn take(&mut self, count: usize, section: &'static str) -> Result<&'a [u8]> {
        if self.bytes.len() < count {
            return Err(Error::TruncatedContainer(section));
        }
        let (head, tail) = self.bytes.split_at(count);
        self.bytes = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self, section: &'static str) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, section)?);
        Ok(array)
    }
}

pub fn parse_framed(bytes: &[u8]) -> Result<FramedArtifact<'_>> {
    let mut cursor = ByteCursor { bytes };
    if cursor.take_array::<4>("magic")? != *MAGIC {
        return Err(Error::InvalidContainerMagic);
    }
    let [version] = cursor.take_array::<1>("version")?;
    if version != VERSION {
        return Err(Error::UnsupportedContainerVersion(version));
    }
    let original_size = u64::from_be_bytes(cursor.take_array("original size")?);
    let bit_count = u64::from_be_bytes(cursor.take_array("bit count")?);
    let shape_length = u16::from_be_bytes(cursor.take_array("shape length")?) as usize;
    let shape = cursor.take(shape_length, "tree shape")?;
    let tree = if shape.is_empty() {
        HuffmanTree::empty()
    } else {
        let mut reader = BitReader::new(shape);
        let tree = HuffmanTree::read_shape(&mut reader)?;
        if reader.bytes_consumed() != shape.len() {
            return Err(Error::InvalidTreeShape);
        }
        tree
    };
    let payload_length = bit_count.div_ceil(8);
    if payload_length != cursor.bytes.len() as u64 {
        return Err(Error::TruncatedContainer("payload"));
    }
    Ok(FramedArtifact {
        original_size,
        bit_count,
        tree,
        payload: cursor.bytes,
    })
}
