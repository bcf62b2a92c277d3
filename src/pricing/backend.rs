use std::future::Future;

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
};

use crate::{
    abi::pricing::ConversionRates::{self, setBaseRateCall, setCompactDataCall},
    call,
    error::ChainError,
    types::{Direction, TokenIndex},
};

/// Chain access needed to set rates: reads of the pricing contract state and
/// submission of the two rate update transactions.
///
/// Implemented for the pricing contract instance, see
/// [`crate::testing::MockPricing`] for an in-memory one.
pub trait PricingBackend {
    /// Position of the token in the compact data arrays.
    fn token_index(
        &self,
        token: Address,
    ) -> impl Future<Output = Result<TokenIndex, ChainError>>;

    /// Base rate currently recorded for the token leg.
    fn basic_rate(
        &self,
        token: Address,
        direction: Direction,
    ) -> impl Future<Output = Result<U256, ChainError>>;

    fn block_number(&self) -> impl Future<Output = Result<u64, ChainError>>;

    fn set_base_rate(
        &self,
        args: setBaseRateCall,
    ) -> impl Future<Output = Result<TxHash, ChainError>>;

    fn set_compact_data(
        &self,
        args: setCompactDataCall,
    ) -> impl Future<Output = Result<TxHash, ChainError>>;
}

impl<P: Provider> PricingBackend for ConversionRates::ConversionRatesInstance<P> {
    async fn token_index(&self, token: Address) -> Result<TokenIndex, ChainError> {
        let data = self.getCompactData(token).call().await?;
        TokenIndex::from_chain(data.arrayIndex, data.fieldOffset)
    }

    async fn basic_rate(&self, token: Address, direction: Direction) -> Result<U256, ChainError> {
        Ok(self.getBasicRate(token, direction.is_buy()).call().await?)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.provider().get_block_number().await?)
    }

    async fn set_base_rate(&self, args: setBaseRateCall) -> Result<TxHash, ChainError> {
        call::submit(self.call_builder(&args)).await
    }

    async fn set_compact_data(&self, args: setCompactDataCall) -> Result<TxHash, ChainError> {
        call::submit(self.call_builder(&args)).await
    }
}
