use std::collections::HashMap;

use alloy::primitives::{Address, TxHash, U256};
use dashmap::DashMap;
use fastnum::D256;
use futures::{StreamExt, TryStreamExt, stream};
use itertools::{Itertools, izip};
use tracing::{debug, info, warn};

use super::backend::PricingBackend;
use crate::{
    abi::pricing::ConversionRates::{setBaseRateCall, setCompactDataCall},
    batch::{self, CompactBatch},
    compact,
    error::{ChainError, InputError, RatesError},
    num,
    types::{Direction, PriceUpdate, TokenIndex},
};

/// Default number of tokens whose chain state is fetched concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Sets token rates through the pricing contract, choosing the cheapest
/// update that expresses them.
///
/// Token indices are cached for the lifetime of the setter.
#[derive(Debug)]
pub struct RateSetter<B> {
    backend: B,
    token_indices: DashMap<Address, TokenIndex>,
    workers: usize,
    converter: num::Converter,
}

impl<B: PricingBackend> RateSetter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            token_indices: DashMap::new(),
            workers: DEFAULT_WORKERS,
            converter: num::Converter::rates(),
        }
    }

    /// Sets the number of tokens whose chain state is fetched concurrently
    /// (default: 4).
    ///
    /// # Panics
    ///
    /// If `workers` is zero.
    pub fn with_workers(mut self, workers: usize) -> Self {
        assert!(workers > 0, "at least one worker is required");
        self.workers = workers;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Position of the token in the compact data arrays, fetched from the
    /// chain on first use.
    pub async fn token_index(&self, token: Address) -> Result<TokenIndex, ChainError> {
        if let Some(index) = self.token_indices.get(&token) {
            return Ok(*index);
        }
        let index = self.backend.token_index(token).await?;
        debug!(%token, array = index.array_index(), field = index.field_index(), "token index fetched");
        // Racing lookups of the same token fetch the same index
        self.token_indices.insert(token, index);
        Ok(index)
    }

    /// Computes the update of the token rates against the recorded base rates.
    ///
    /// Base rates of the two legs are read one after the other.
    pub async fn price_update(
        &self,
        token: Address,
        buy: U256,
        sell: U256,
    ) -> Result<PriceUpdate, ChainError> {
        let base_buy = self.backend.basic_rate(token, Direction::Buy).await?;
        let base_sell = self.backend.basic_rate(token, Direction::Sell).await?;
        let update = compact::build_price_update(token, buy, sell, base_buy, base_sell);
        debug!(?update, "price update computed");
        Ok(update)
    }

    /// Sets buy and sell rates of the tokens, expressed in tokens per ETH
    /// (buy) and ETH per token (sell) with up to 18 decimals.
    ///
    /// See [`Self::set_rates_wei`].
    pub async fn set_rates(
        &self,
        tokens: &[Address],
        buy_rates: &[D256],
        sell_rates: &[D256],
    ) -> Result<TxHash, RatesError> {
        check_lengths(tokens, buy_rates.len(), sell_rates.len())?;
        let buy = self.to_wei(tokens, buy_rates, Direction::Buy)?;
        let sell = self.to_wei(tokens, sell_rates, Direction::Sell)?;
        self.set_rates_wei(tokens, &buy, &sell).await
    }

    /// Sets buy and sell rates of the tokens, in 18 decimals fixed-point form,
    /// with a single transaction.
    ///
    /// If the new rates of every token fit the compact deltas, only those are
    /// updated. Otherwise base rates of the tokens that do not fit are reset
    /// along with the compact deltas of all tokens.
    ///
    /// Nothing is submitted if any input is malformed or any chain read fails.
    pub async fn set_rates_wei(
        &self,
        tokens: &[Address],
        buy_rates: &[U256],
        sell_rates: &[U256],
    ) -> Result<TxHash, RatesError> {
        check_lengths(tokens, buy_rates.len(), sell_rates.len())?;

        let indices = self.token_indices(tokens).await?;
        let updates = self.price_updates(tokens, buy_rates, sell_rates).await?;

        let token_indices = tokens
            .iter()
            .copied()
            .zip(indices)
            .collect::<HashMap<_, _>>();
        let batch = batch::build_compact_batch(&updates, &token_indices)?;
        let block_number = self
            .backend
            .block_number()
            .await
            .map_err(RatesError::lookup("block number"))?;

        let (reset_tokens, base_buy, base_sell): (Vec<_>, Vec<_>, Vec<_>) = updates
            .iter()
            .filter(|u| u.base_changed())
            .map(|u| (u.token(), u.base_buy(), u.base_sell()))
            .multiunzip();
        let (buy, sell, indices) = batch.into_parts();

        let tx_hash = if reset_tokens.is_empty() {
            info!(tokens = tokens.len(), slots = indices.len(), block_number, "setting compact data");
            self.backend
                .set_compact_data(setCompactDataCall {
                    buy,
                    sell,
                    blockNumber: U256::from(block_number),
                    indices,
                })
                .await
        } else {
            warn!(
                tokens = tokens.len(),
                resets = reset_tokens.len(),
                block_number,
                "setting base rates"
            );
            self.backend
                .set_base_rate(setBaseRateCall {
                    tokens: reset_tokens,
                    baseBuy: base_buy,
                    baseSell: base_sell,
                    buy,
                    sell,
                    blockNumber: U256::from(block_number),
                    indices,
                })
                .await
        }
        .map_err(RatesError::Submission)?;

        info!(%tx_hash, "rates submitted");
        Ok(tx_hash)
    }

    /// Updates compact deltas of a prepared batch, fenced at the current block.
    pub async fn set_compact_data(&self, batch: CompactBatch) -> Result<TxHash, ChainError> {
        let block_number = self.backend.block_number().await?;
        let (buy, sell, indices) = batch.into_parts();
        self.backend
            .set_compact_data(setCompactDataCall {
                buy,
                sell,
                blockNumber: U256::from(block_number),
                indices,
            })
            .await
    }

    async fn token_indices(&self, tokens: &[Address]) -> Result<Vec<TokenIndex>, RatesError> {
        stream::iter(tokens)
            .map(|token| async move {
                self.token_index(*token)
                    .await
                    .map_err(RatesError::lookup(format!("token index of {token}")))
            })
            .buffered(self.workers)
            .try_collect()
            .await
    }

    /// Reads the base rates of both legs of every token, at most `workers`
    /// reads in flight, and compacts the new rates against them.
    async fn price_updates(
        &self,
        tokens: &[Address],
        buy_rates: &[U256],
        sell_rates: &[U256],
    ) -> Result<Vec<PriceUpdate>, RatesError> {
        let legs = tokens
            .iter()
            .flat_map(|token| [(*token, Direction::Buy), (*token, Direction::Sell)]);
        let base_rates: Vec<U256> = stream::iter(legs)
            .map(|(token, direction)| async move {
                self.backend
                    .basic_rate(token, direction)
                    .await
                    .map_err(RatesError::lookup(format!("{direction} base rate of {token}")))
            })
            .buffered(self.workers)
            .try_collect()
            .await?;

        Ok(izip!(tokens, buy_rates, sell_rates, base_rates.chunks_exact(2))
            .map(|(token, buy, sell, base)| {
                let update = compact::build_price_update(*token, *buy, *sell, base[0], base[1]);
                debug!(?update, "price update computed");
                update
            })
            .collect())
    }

    fn to_wei(
        &self,
        tokens: &[Address],
        rates: &[D256],
        direction: Direction,
    ) -> Result<Vec<U256>, InputError> {
        tokens
            .iter()
            .zip(rates)
            .map(|(token, rate)| {
                self.converter
                    .to_non_negative(*rate)
                    .ok_or_else(|| InputError::InvalidRate {
                        token: *token,
                        direction,
                        rate: rate.to_string(),
                    })
            })
            .collect()
    }
}

fn check_lengths(tokens: &[Address], buy: usize, sell: usize) -> Result<(), InputError> {
    if tokens.len() != buy || tokens.len() != sell {
        return Err(InputError::LengthMismatch {
            tokens: tokens.len(),
            buy,
            sell,
        });
    }
    if tokens.is_empty() {
        return Err(InputError::Empty);
    }
    if let Some(token) = tokens.iter().duplicates().next() {
        return Err(InputError::DuplicateToken(*token));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::dec256;

    use super::*;
    use crate::testing::MockPricing;

    const KNC: Address = address!("0xdd974D5C2e2928deA5F71b9825b8b646686BD200");
    const OMG: Address = address!("0xd26114cd6EE289AccF82350c8d8487fedB8A0C07");

    fn setter() -> RateSetter<MockPricing> {
        let backend = MockPricing::new(100);
        backend.register(KNC, TokenIndex::new(0, 0), U256::from(1000), U256::from(1000));
        backend.register(OMG, TokenIndex::new(0, 1), U256::from(1000), U256::from(1000));
        RateSetter::new(backend)
    }

    #[test]
    fn test_check_lengths() {
        assert_eq!(
            check_lengths(&[KNC, OMG], 2, 1),
            Err(InputError::LengthMismatch {
                tokens: 2,
                buy: 2,
                sell: 1
            })
        );
        assert_eq!(check_lengths(&[], 0, 0), Err(InputError::Empty));
        assert_eq!(
            check_lengths(&[KNC, OMG, KNC], 3, 3),
            Err(InputError::DuplicateToken(KNC))
        );
        assert_eq!(check_lengths(&[KNC, OMG], 2, 2), Ok(()));
    }

    #[test]
    fn test_token_index_cached() {
        let setter = setter();
        tokio_test::block_on(async {
            assert_eq!(setter.token_index(KNC).await.unwrap(), TokenIndex::new(0, 0));
            assert_eq!(setter.token_index(KNC).await.unwrap(), TokenIndex::new(0, 0));
            assert_eq!(setter.token_index(OMG).await.unwrap(), TokenIndex::new(0, 1));
        });
        assert_eq!(setter.backend().index_lookups(), 2);
    }

    #[tokio::test]
    async fn test_decimal_rates_rejected_before_lookups() {
        let setter = setter();
        let err = setter
            .set_rates(&[KNC, OMG], &[dec256!(1), dec256!(-1)], &[dec256!(1), dec256!(1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RatesError::MalformedInput(InputError::InvalidRate {
                token,
                direction: Direction::Buy,
                ..
            }) if token == OMG
        ));

        let err = setter
            .set_rates(&[KNC], &[dec256!(1)], &[D256::NAN])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RatesError::MalformedInput(InputError::InvalidRate {
                direction: Direction::Sell,
                ..
            })
        ));

        let err = setter
            .set_rates(&[KNC], &[dec256!(1e60)], &[dec256!(1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RatesError::MalformedInput(InputError::InvalidRate {
                direction: Direction::Buy,
                ..
            })
        ));

        assert_eq!(setter.backend().index_lookups(), 0);
        assert!(setter.backend().submissions().is_empty());
    }

    #[tokio::test]
    async fn test_decimal_rates_converted_to_wei() {
        let backend = MockPricing::new(100);
        let base = U256::from(500u64) * U256::from(10u64).pow(U256::from(18));
        backend.register(KNC, TokenIndex::new(0, 0), base, U256::ZERO);
        let setter = RateSetter::new(backend);

        setter
            .set_rates(&[KNC], &[dec256!(505)], &[dec256!(0.00182)])
            .await
            .unwrap();

        let submissions = setter.backend().submissions();
        let call = submissions[0].as_base_rate().expect("base rate reset");
        assert_eq!(call.tokens, vec![KNC]);
        assert_eq!(call.baseBuy, vec![base]);
        assert_eq!(call.baseSell, vec![U256::from(1_820_000_000_000_000u64)]);
        assert_eq!(call.buy[0][0], 10);
    }

    #[test]
    #[should_panic(expected = "at least one worker is required")]
    fn test_zero_workers() {
        setter().with_workers(0);
    }
}
