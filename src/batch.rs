//! Packing of per-token compact deltas into the pricing contract layout.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};

use crate::{
    error::InputError,
    types::{COMPACT_FIELDS, CompactBytes, PriceUpdate, TokenIndex},
};

/// Compact deltas grouped by array slot, ready to be passed to
/// `setCompactData`/`setBaseRate`.
///
/// `buy[i]` and `sell[i]` hold the packed deltas of the slot `indices[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompactBatch {
    buy: Vec<CompactBytes>,
    sell: Vec<CompactBytes>,
    indices: Vec<U256>,
}

impl CompactBatch {
    pub fn buy(&self) -> &[CompactBytes] {
        &self.buy
    }

    pub fn sell(&self) -> &[CompactBytes] {
        &self.sell
    }

    pub fn indices(&self) -> &[U256] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Splits the batch into `(buy, sell, indices)` call arguments.
    pub fn into_parts(self) -> (Vec<CompactBytes>, Vec<CompactBytes>, Vec<U256>) {
        (self.buy, self.sell, self.indices)
    }
}

/// Builds the compact batch for the given updates.
///
/// Array slots appear in the order they are first referenced by `updates`.
/// Fields of a slot not covered by any update are zero, so every token sharing
/// a slot with an updated one should be part of the same batch.
pub fn build_compact_batch(
    updates: &[PriceUpdate],
    token_indices: &HashMap<Address, TokenIndex>,
) -> Result<CompactBatch, InputError> {
    let mut slots: Vec<(u64, [u8; COMPACT_FIELDS], [u8; COMPACT_FIELDS])> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for update in updates {
        let index = token_indices
            .get(&update.token())
            .ok_or(InputError::UnindexedToken(update.token()))?;
        let pos = *positions.entry(index.array_index()).or_insert_with(|| {
            slots.push((index.array_index(), [0; COMPACT_FIELDS], [0; COMPACT_FIELDS]));
            slots.len() - 1
        });
        let (_, buy, sell) = &mut slots[pos];
        buy[index.field_index()] = update.compact_buy();
        sell[index.field_index()] = update.compact_sell();
    }

    let mut batch = CompactBatch::default();
    for (array_index, buy, sell) in slots {
        batch.buy.push(CompactBytes::from(buy));
        batch.sell.push(CompactBytes::from(sell));
        batch.indices.push(U256::from(array_index));
    }
    Ok(batch)
}
