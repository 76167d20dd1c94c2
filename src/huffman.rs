use clap::{builder::PossibleValue, ValueEnum};

pub mod code;
pub mod decoder;
pub mod encoder;
pub mod frequency;
pub mod tree;

pub type Symbol = u8;

pub const ALPHABET_SIZE: usize = Symbol::MAX as usize + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolFrequency {
    pub symbol: Symbol,
    pub frequency: u64,
}

impl SymbolFrequency {
    pub fn new(symbol: Symbol, frequency: u64) -> Self {
        Self { symbol, frequency }
    }
}

impl From<(Symbol, u64)> for SymbolFrequency {
    fn from(value: (Symbol, u64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Which symbols become leaves of the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymbolSet {
    /// every byte value, zero frequencies included
    #[default]
    Full,
    /// only bytes that occur in the input
    Observed,
}

impl ValueEnum for SymbolSet {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Full, Self::Observed]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Full => Some(PossibleValue::new("Full")),
            Self::Observed => Some(PossibleValue::new("Observed")),
        }
    }
}
