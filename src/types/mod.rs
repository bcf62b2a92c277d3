use std::fmt;

use alloy::primitives::{Address, U256};

use crate::error::ChainError;

/// Number of tokens packed into one compact data array slot.
pub const COMPACT_FIELDS: usize = 14;

/// Packed per-slot compact deltas, one byte per field.
pub type CompactBytes = alloy::primitives::FixedBytes<COMPACT_FIELDS>;

/// Leg of a token rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// ETH to token.
    Buy,
    /// Token to ETH.
    Sell,
}

impl Direction {
    pub fn is_buy(&self) -> bool {
        matches!(self, Direction::Buy)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

/// Position of a token's compact deltas inside the pricing contract storage.
///
/// Assigned once the token is added to the pricing contract and never
/// changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenIndex {
    array_index: u64,
    field_index: u8,
}

impl TokenIndex {
    /// # Panics
    ///
    /// If `field_index` does not address a field of a compact array.
    pub fn new(array_index: u64, field_index: u8) -> Self {
        assert!(
            (field_index as usize) < COMPACT_FIELDS,
            "field index out of range: {field_index}"
        );
        Self {
            array_index,
            field_index,
        }
    }

    pub(crate) fn from_chain(array_index: U256, field_index: U256) -> Result<Self, ChainError> {
        match (u64::try_from(array_index), u8::try_from(field_index)) {
            (Ok(array), Ok(field)) if (field as usize) < COMPACT_FIELDS => {
                Ok(Self::new(array, field))
            }
            _ => Err(ChainError::Fatal(format!(
                "compact data index out of range, array: {array_index}, field: {field_index}"
            ))),
        }
    }

    pub fn array_index(&self) -> u64 {
        self.array_index
    }

    pub fn field_index(&self) -> usize {
        self.field_index as usize
    }
}

/// Result of compacting one rate leg: a base rate and a delta relative to it.
///
/// `compact` is meaningless without the `base` it was computed against.
#[derive(Clone, Copy, PartialEq, Eq, derive_more::Debug)]
pub struct CompactData {
    base: U256,
    #[debug("{compact:#04x}")]
    compact: u8,
}

impl CompactData {
    pub(crate) fn new(base: U256, compact: u8) -> Self {
        Self { base, compact }
    }

    /// Base rate the delta applies to.
    pub fn base(&self) -> U256 {
        self.base
    }

    /// Delta in 1/1000 of the base rate, stored as a two's complement byte.
    pub fn compact(&self) -> u8 {
        self.compact
    }
}

/// Rate update computed for a single token.
#[derive(Clone, Copy, PartialEq, Eq, derive_more::Debug)]
pub struct PriceUpdate {
    token: Address,
    base_buy: U256,
    base_sell: U256,
    #[debug("{compact_buy:#04x}")]
    compact_buy: u8,
    #[debug("{compact_sell:#04x}")]
    compact_sell: u8,
    base_changed: bool,
}

impl PriceUpdate {
    pub(crate) fn new(token: Address, buy: CompactData, sell: CompactData, base_changed: bool) -> Self {
        Self {
            token,
            base_buy: buy.base,
            base_sell: sell.base,
            compact_buy: buy.compact,
            compact_sell: sell.compact,
            base_changed,
        }
    }

    pub fn token(&self) -> Address {
        self.token
    }

    /// New base buy rate if [`Self::base_changed`], the recorded one otherwise.
    pub fn base_buy(&self) -> U256 {
        self.base_buy
    }

    /// New base sell rate if [`Self::base_changed`], the recorded one otherwise.
    pub fn base_sell(&self) -> U256 {
        self.base_sell
    }

    pub fn compact_buy(&self) -> u8 {
        self.compact_buy
    }

    pub fn compact_sell(&self) -> u8 {
        self.compact_sell
    }

    /// Whether either leg requires a base rate reset.
    pub fn base_changed(&self) -> bool {
        self.base_changed
    }
}
